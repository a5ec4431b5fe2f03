use serde::{Deserialize, Serialize};

/// Browser tab identifier as reported by the extension shim.
pub type TabId = i64;

/// Ordered list of domain fragments considered trusted.
///
/// Entries are trimmed and lowercased on construction; empty entries are
/// dropped since they would match every host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SafetyDocument")]
pub struct SafetyList {
    safe: Vec<String>,
}

/// Wire shape of the remote and bundled documents. Fields other than
/// `safe` are ignored.
#[derive(Debug, Deserialize)]
struct SafetyDocument {
    safe: Vec<String>,
}

impl From<SafetyDocument> for SafetyList {
    fn from(doc: SafetyDocument) -> Self {
        SafetyList::new(doc.safe)
    }
}

impl SafetyList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let safe = entries
            .into_iter()
            .map(|entry| entry.as_ref().trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { safe }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn entries(&self) -> &[String] {
        &self.safe
    }

    pub fn len(&self) -> usize {
        self.safe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.safe.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Safe,
    /// Never produced by the substring classifier; kept so the UI mapping
    /// stays total.
    Unsafe,
    Unknown,
}

impl Classification {
    pub fn icon_set(self) -> IconSet {
        match self {
            Classification::Safe => IconSet::Safe,
            Classification::Unsafe => IconSet::Unsafe,
            Classification::Unknown => IconSet::Unknown,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Classification::Safe => "This website is safe",
            Classification::Unsafe => "Warning: This website may be unsafe",
            Classification::Unknown => "Safety status unknown",
        }
    }
}

pub const ICON_SIZES: [u32; 4] = [16, 32, 48, 128];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSet {
    Safe,
    Unsafe,
    Unknown,
}

impl IconSet {
    pub fn id(self) -> &'static str {
        match self {
            IconSet::Safe => "safe",
            IconSet::Unsafe => "unsafe",
            IconSet::Unknown => "unknown",
        }
    }

    /// Asset path for every supported resolution, smallest first.
    pub fn paths(self) -> Vec<(u32, String)> {
        let id = self.id();
        ICON_SIZES
            .iter()
            .map(|size| (*size, format!("icons/{id}/{id}-{size}.png")))
            .collect()
    }
}
