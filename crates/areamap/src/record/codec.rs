//! JSON wire format for [`AreaRecord`].
//!
//! ```text
//! { "id": 1, "offset": {"x":..,"y":..}, "size": {"width":..,"height":..},
//!   "crop": {"x0":..,"y0":..,"x1":..,"y1":..}, "mapData": [..],
//!   "exits": {"2": {"offsets": [..], "isPortal": true}},
//!   "npcs": {"100": [{"x":..,"y":..}]}, "objects": {..}, "pathData": [..] }
//! ```
//!
//! A helper process that fails to produce a map sends `{"error": "..."}`
//! instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size};
use crate::path::decode_path_data;

use super::{AreaRecord, Exit};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRecordRef<'a> {
    id: u32,
    offset: Point,
    size: Size,
    crop: Rect,
    map_data: &'a [i16],
    exits: &'a BTreeMap<u32, Exit>,
    npcs: &'a BTreeMap<u32, Vec<Point>>,
    objects: &'a BTreeMap<u32, Vec<Point>>,
    path_data: &'a [u8],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    id: u32,
    offset: Point,
    size: Size,
    crop: Rect,
    map_data: Vec<i16>,
    #[serde(default)]
    exits: BTreeMap<u32, Exit>,
    #[serde(default)]
    npcs: BTreeMap<u32, Vec<Point>>,
    #[serde(default)]
    objects: BTreeMap<u32, Vec<Point>>,
    #[serde(default)]
    path_data: Vec<u8>,
}

impl AreaRecord {
    /// Parse a wire record.
    ///
    /// Never fails: malformed payloads and upstream `error` fields produce a
    /// record with `built == false` and `error_string` set.
    pub fn decode(bytes: &[u8]) -> AreaRecord {
        match Self::try_decode(bytes) {
            Ok(record) => record,
            Err(e) => {
                debug!("Failed to decode area record: {}", e);
                AreaRecord::failed(0, e.to_string())
            }
        }
    }

    fn try_decode(bytes: &[u8]) -> Result<AreaRecord> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::Decode("empty payload".to_string()));
        }

        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if let Some(error) = value.get("error") {
            let message = match error.as_str() {
                Some(s) => s.to_string(),
                None => error.to_string(),
            };
            return Err(Error::Upstream(message));
        }

        let wire: WireRecord = serde_json::from_value(value)?;
        if !wire.crop.is_ordered() {
            return Err(Error::Decode(format!(
                "crop is inverted: {:?}",
                wire.crop
            )));
        }

        let mut record = AreaRecord {
            id: wire.id,
            offset: wire.offset,
            size: wire.size,
            crop: wire.crop,
            map_data: wire.map_data,
            exits: wire.exits,
            npcs: wire.npcs,
            objects: wire.objects,
            path: Vec::new(),
            path_data: wire.path_data,
            built: true,
            error_string: None,
        };

        record.check_map_data()?;

        if !record.path_data.is_empty() {
            let (w, h) = record.path_dimensions();
            let cells = w
                .checked_mul(h)
                .ok_or_else(|| Error::Decode(format!("crop {:?} is too large", record.crop)))?;
            record.path = decode_path_data(&record.path_data, cells)?;
        }

        Ok(record)
    }

    /// Serialize to the wire format.
    ///
    /// Returns an empty buffer for records that were never built. With
    /// `include_path_data == false` the `pathData` field is written empty; the
    /// record itself is untouched. `indent == 0` produces compact output.
    pub fn encode(&self, include_path_data: bool, indent: usize) -> Vec<u8> {
        if !self.built {
            return Vec::new();
        }

        let wire = WireRecordRef {
            id: self.id,
            offset: self.offset,
            size: self.size,
            crop: self.crop,
            map_data: &self.map_data,
            exits: &self.exits,
            npcs: &self.npcs,
            objects: &self.objects,
            path_data: if include_path_data {
                &self.path_data
            } else {
                &[]
            },
        };

        let encoded = if indent == 0 {
            serde_json::to_vec(&wire)
        } else {
            let indent = vec![b' '; indent];
            let mut out = Vec::new();
            let mut serializer =
                serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
            wire.serialize(&mut serializer).map(|_| out)
        };

        encoded.unwrap_or_else(|e| {
            warn!("Failed to encode area record {}: {}", self.id, e);
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_map_data;

    fn sample() -> AreaRecord {
        let mut walkable = vec![true; 10 * 5];
        for x in 0..10 {
            walkable[x] = false;
        }
        let mut record = AreaRecord {
            id: 2,
            offset: Point::new(50, 25),
            size: Size::new(15, 10),
            crop: Rect::new(5, 0, 15, 5),
            map_data: encode_map_data(&walkable, 10, 5),
            built: true,
            ..Default::default()
        };
        record.exits.insert(
            1,
            Exit {
                offsets: vec![Point::new(55, 27)],
                is_portal: false,
            },
        );
        record.exits.insert(
            40,
            Exit {
                offsets: vec![Point::new(60, 28), Point::new(61, 28)],
                is_portal: true,
            },
        );
        record.npcs.insert(100, vec![Point::new(57, 26)]);
        record.objects.insert(7, vec![Point::new(58, 29), Point::new(59, 29)]);
        record.generate_path_data();
        record
    }

    #[test]
    fn test_encode_decode_reproduces_record() {
        let record = sample();
        assert!(!record.path_data.is_empty());

        let decoded = AreaRecord::decode(&record.encode(true, 0));
        assert_eq!(decoded, record);

        let decoded = AreaRecord::decode(&record.encode(true, 2));
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_encode_without_path_data_leaves_record_intact() {
        let record = sample();
        let before = record.path_data.clone();

        let bytes = record.encode(false, 0);
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["pathData"], serde_json::json!([]));
        assert_eq!(record.path_data, before);

        let decoded = AreaRecord::decode(&bytes);
        assert!(decoded.built);
        assert!(decoded.path.is_empty());
        assert_eq!(decoded.map_data, record.map_data);
    }

    #[test]
    fn test_encode_uses_wire_field_names() {
        let value: serde_json::Value = serde_json::from_slice(&sample().encode(true, 0)).unwrap();
        assert_eq!(value["crop"], serde_json::json!({"x0": 5, "y0": 0, "x1": 15, "y1": 5}));
        assert_eq!(value["size"], serde_json::json!({"width": 15, "height": 10}));
        assert_eq!(value["exits"]["40"]["isPortal"], serde_json::json!(true));
        assert_eq!(value["npcs"]["100"], serde_json::json!([{"x": 57, "y": 26}]));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_encode_indent() {
        let record = sample();
        let pretty = String::from_utf8(record.encode(true, 4)).unwrap();
        assert!(pretty.contains("\n    \"id\": 2"));
        let compact = String::from_utf8(record.encode(true, 0)).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_encode_unbuilt_is_empty() {
        assert!(AreaRecord::failed(3, "nope").encode(true, 0).is_empty());
    }

    #[test]
    fn test_decode_upstream_error() {
        let record = AreaRecord::decode(br#"{"error":"Invalid map id!"}"#);
        assert!(!record.built);
        assert_eq!(record.error_string.as_deref(), Some("Invalid map id!"));
    }

    #[test]
    fn test_decode_malformed_payloads() {
        for payload in [&b""[..], b"   ", b"{not json", b"[]", br#"{"id": 1}"#] {
            let record = AreaRecord::decode(payload);
            assert!(!record.built, "payload {:?} should not decode", payload);
            assert!(record.error_string.is_some());
        }
    }

    #[test]
    fn test_decode_rejects_inverted_crop() {
        let payload = br#"{"id":1,"offset":{"x":0,"y":0},"size":{"width":5,"height":5},
            "crop":{"x0":5,"y0":0,"x1":0,"y1":5},"mapData":[]}"#;
        assert!(!AreaRecord::decode(payload).built);
    }

    #[test]
    fn test_decode_rejects_path_data_of_wrong_size() {
        let payload = br#"{"id":1,"offset":{"x":0,"y":0},"size":{"width":10,"height":5},
            "crop":{"x0":0,"y0":0,"x1":10,"y1":5},"mapData":[10,-1,10,-1,10,-1,10,-1,10,-1],
            "pathData":[0,5]}"#;
        let record = AreaRecord::decode(payload);
        assert!(!record.built);
        assert!(record.error_string.unwrap().contains("expected 2"));
    }

    #[test]
    fn test_decode_rejects_map_data_not_matching_crop() {
        let payload = br#"{"id":1,"offset":{"x":0,"y":0},"size":{"width":5,"height":5},
            "crop":{"x0":0,"y0":0,"x1":5,"y1":5},"mapData":[2,-1]}"#;
        let record = AreaRecord::decode(payload);
        assert!(!record.built);
        assert_eq!(
            record.error_string.as_deref(),
            Some("Invalid map data at row 0: runs sum to 2, expected 5")
        );
    }

    #[test]
    fn test_decode_huge_crop_with_tiny_path_data() {
        let payload = br#"{"id":1,"offset":{"x":0,"y":0},"size":{"width":5,"height":5},
            "crop":{"x0":0,"y0":0,"x1":2000000000,"y1":2000000000},"mapData":[],
            "pathData":[0,1]}"#;
        let record = AreaRecord::decode(payload);
        assert!(!record.built);
        assert!(record.error_string.is_some());
    }

    #[test]
    fn test_decode_optional_tables_default_empty() {
        let payload = br#"{"id":4,"offset":{"x":0,"y":0},"size":{"width":5,"height":5},
            "crop":{"x0":0,"y0":0,"x1":5,"y1":1},"mapData":[5,-1]}"#;
        let record = AreaRecord::decode(payload);
        assert!(record.built);
        assert!(record.exits.is_empty());
        assert!(record.path.is_empty());
        assert!(record.check_map_data().is_ok());
    }
}
