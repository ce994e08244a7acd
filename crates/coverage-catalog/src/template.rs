//! URL-fragment templating.

/// Substitute `{name}` placeholders in a URL template.
///
/// Placeholders without a binding are left untouched; fnmatch wildcard
/// characters (`*`, `?`, `[`, `]`) pass through for the resolver to
/// handle. Plain string templating, no dispatch on the configuration.
pub fn render_url_fragment<N, V>(template: &str, bindings: &[(N, V)]) -> String
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut rendered = template.to_string();
    for (name, value) in bindings {
        rendered = rendered.replace(&format!("{{{}}}", name.as_ref()), value.as_ref());
    }
    rendered
}
