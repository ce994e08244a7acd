//! THREDDS catalog.xml parsing.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ThreddsResult;

/// Collect the `name` attribute of every `dataset` element, in document
/// order.
///
/// THREDDS serves its listings in the catalog namespace; matching on the
/// local element name tolerates any prefix. The outermost container
/// dataset is collected too; callers filter by filename pattern, which a
/// directory name will not match.
pub fn parse_dataset_names(xml: &str) -> ThreddsResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut names = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().local_name().as_ref() == b"dataset" {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"name" {
                            names.push(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog xmlns="http://www.unidata.ucar.edu/namespaces/thredds/InvCatalog/v1.0"
         name="climate data">
  <service name="all" serviceType="Compound" base="">
    <service name="fileServer" serviceType="HTTPServer" base="/thredds/fileServer/"/>
  </service>
  <dataset name="daily" ID="daily">
    <dataset name="tas_v1_rcp26.nc" ID="daily/tas_v1_rcp26.nc" urlPath="daily/tas_v1_rcp26.nc">
      <dataSize units="Mbytes">12.4</dataSize>
    </dataset>
    <dataset name="tas_v2_rcp26.nc" ID="daily/tas_v2_rcp26.nc" urlPath="daily/tas_v2_rcp26.nc"/>
  </dataset>
</catalog>
"#;

    #[test]
    fn test_collects_names_in_document_order() {
        let names = parse_dataset_names(SAMPLE_CATALOG).unwrap();
        assert_eq!(names, vec!["daily", "tas_v1_rcp26.nc", "tas_v2_rcp26.nc"]);
    }

    #[test]
    fn test_prefixed_namespace() {
        let xml = r#"<t:catalog xmlns:t="http://www.unidata.ucar.edu/namespaces/thredds/InvCatalog/v1.0">
  <t:dataset name="pr_anom.nc" urlPath="pr_anom.nc"/>
</t:catalog>"#;
        let names = parse_dataset_names(xml).unwrap();
        assert_eq!(names, vec!["pr_anom.nc"]);
    }

    #[test]
    fn test_document_without_datasets() {
        let names = parse_dataset_names("<catalog></catalog>").unwrap();
        assert!(names.is_empty());
    }
}
