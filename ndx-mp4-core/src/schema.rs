//! NWB namespace declaration for the ndx-mp4 extension
//!
//! Declares the two group types consumed by the host format's validator:
//! the abstract `BaseVideo` (an `fps` attribute plus `data` and `shape`
//! datasets) and the concrete `MP4H264Video`, whose `data` specifically
//! holds MP4 container bytes with an H.264 (AVC) stream.

use serde::Serialize;

/// Namespace name registered with the host format
pub const NAMESPACE: &str = "ndx-mp4";

/// Namespace version
pub const NAMESPACE_VERSION: &str = "0.1.0";

/// An attribute carried by a group type
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub dtype: &'static str,
    pub doc: &'static str,
}

/// A dataset carried by a group type
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSpec {
    pub name: &'static str,
    pub dtype: &'static str,
    pub doc: &'static str,
    /// Allowed shapes; empty for scalar datasets
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shape: Vec<Vec<u32>>,
}

/// A typed group declared by the namespace
#[derive(Debug, Clone, Serialize)]
pub struct GroupSpec {
    pub data_type_def: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type_inc: Option<&'static str>,
    pub doc: &'static str,
    pub attributes: Vec<AttributeSpec>,
    pub datasets: Vec<DatasetSpec>,
}

/// The full namespace declaration
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceSpec {
    pub name: &'static str,
    pub version: &'static str,
    pub doc: &'static str,
    pub groups: Vec<GroupSpec>,
}

impl NamespaceSpec {
    /// Serializes the declaration to JSON for the host validator
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builds the ndx-mp4 namespace declaration
pub fn extension_namespace() -> NamespaceSpec {
    NamespaceSpec {
        name: NAMESPACE,
        version: NAMESPACE_VERSION,
        doc: "NWB extension to store MP4 video data as bytes",
        groups: vec![
            GroupSpec {
                data_type_def: "BaseVideo",
                data_type_inc: None,
                doc: "Video stored as an encoded byte stream with its declared \
                      shape and frame rate.",
                attributes: vec![AttributeSpec {
                    name: "fps",
                    dtype: "float64",
                    doc: "Frames per second of the video.",
                }],
                datasets: vec![
                    DatasetSpec {
                        name: "data",
                        dtype: "bytes",
                        doc: "The encoded video as a scalar dataset of bytes.",
                        shape: vec![],
                    },
                    DatasetSpec {
                        name: "shape",
                        dtype: "uint32",
                        doc: "Decoded dimensions: (frames, height, width) or \
                              (frames, height, width, 3).",
                        shape: vec![vec![3], vec![4]],
                    },
                ],
            },
            GroupSpec {
                data_type_def: "MP4H264Video",
                data_type_inc: Some("BaseVideo"),
                doc: "BaseVideo whose data holds MP4 container bytes carrying \
                      an H.264 (AVC) video stream.",
                attributes: vec![],
                datasets: vec![],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_declares_both_types() {
        let ns = extension_namespace();
        assert_eq!(ns.name, NAMESPACE);
        assert_eq!(ns.groups.len(), 2);
        assert_eq!(ns.groups[0].data_type_def, "BaseVideo");
        assert_eq!(ns.groups[1].data_type_def, "MP4H264Video");
        assert_eq!(ns.groups[1].data_type_inc, Some("BaseVideo"));
    }

    #[test]
    fn test_json_export() {
        let json = extension_namespace().to_json().unwrap();
        assert!(json.contains("\"BaseVideo\""));
        assert!(json.contains("\"MP4H264Video\""));
        assert!(json.contains("\"fps\""));
        assert!(json.contains("\"shape\""));
    }
}
