//! JSON feed for the CMS.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::RenderResult;
use crate::transform::OutputRecord;

/// Serialize records as `{ uid: { field: value } }`, pretty-printed with
/// sorted keys and a trailing newline.
pub fn render_json(records: &[(String, OutputRecord)]) -> RenderResult<String> {
    let by_uid: BTreeMap<&str, &OutputRecord> = records
        .iter()
        .map(|(uid, record)| (uid.as_str(), record))
        .collect();

    let mut json = serde_json::to_string_pretty(&by_uid)?;
    json.push('\n');
    Ok(json)
}

pub fn write_json(path: &Path, records: &[(String, OutputRecord)]) -> RenderResult<()> {
    let json = render_json(records)?;
    fs::write(path, json)?;
    info!(path = %path.display(), persons = records.len(), "Wrote JSON feed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> OutputRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_json_sorted() {
        let records = vec![
            ("zed".to_string(), record(&[("title", "Z"), ("display_name", "Zed")])),
            ("amy".to_string(), record(&[("location", ""), ("display_name", "Amy")])),
        ];

        let json = render_json(&records).unwrap();
        let expected = r#"{
  "amy": {
    "display_name": "Amy",
    "location": ""
  },
  "zed": {
    "display_name": "Zed",
    "title": "Z"
  }
}
"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_render_json_empty() {
        assert_eq!(render_json(&[]).unwrap(), "{}\n");
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drupal.json");
        let records = vec![("tp1".to_string(), record(&[("unit", "SSDR")]))];

        write_json(&path, &records).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["tp1"]["unit"], "SSDR");
    }
}
