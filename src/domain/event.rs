use serde::{Deserialize, Serialize};

use super::types::{IconSet, TabId};

/// Event forwarded by the extension shim, one per input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BrowserEvent {
    Startup,
    TabUpdated {
        tab_id: TabId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// `url` is optional: the shim may attach the URL it resolved for the
    /// focused tab, otherwise the host looks it up.
    TabActivated {
        tab_id: TabId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    TabRemoved {
        tab_id: TabId,
    },
}

/// Page-action command sent back to the extension shim, one per output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiCommand {
    ShowIndicator {
        tab_id: TabId,
    },
    SetIcon {
        tab_id: TabId,
        icon_set: IconSet,
        path: std::collections::BTreeMap<String, String>,
    },
    SetTitle {
        tab_id: TabId,
        title: String,
    },
}

impl UiCommand {
    pub fn set_icon(tab_id: TabId, icon_set: IconSet) -> Self {
        let path = icon_set
            .paths()
            .into_iter()
            .map(|(size, path)| (size.to_string(), path))
            .collect();
        UiCommand::SetIcon {
            tab_id,
            icon_set,
            path,
        }
    }

    pub fn tab_id(&self) -> TabId {
        match self {
            UiCommand::ShowIndicator { tab_id }
            | UiCommand::SetIcon { tab_id, .. }
            | UiCommand::SetTitle { tab_id, .. } => *tab_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_events() {
        let event: BrowserEvent =
            serde_json::from_str(r#"{"type":"tabUpdated","tabId":4,"url":"https://a.org/"}"#)
                .unwrap();
        assert_eq!(
            event,
            BrowserEvent::TabUpdated {
                tab_id: 4,
                url: Some("https://a.org/".to_string())
            }
        );

        let event: BrowserEvent =
            serde_json::from_str(r#"{"type":"tabUpdated","tabId":4,"status":"loading"}"#)
                .unwrap();
        assert_eq!(event, BrowserEvent::TabUpdated { tab_id: 4, url: None });

        let event: BrowserEvent = serde_json::from_str(r#"{"type":"startup"}"#).unwrap();
        assert_eq!(event, BrowserEvent::Startup);

        let event: BrowserEvent =
            serde_json::from_str(r#"{"type":"tabActivated","tabId":9}"#).unwrap();
        assert_eq!(event, BrowserEvent::TabActivated { tab_id: 9, url: None });

        let event: BrowserEvent = serde_json::from_str(
            r#"{"type":"tabActivated","tabId":9,"url":"https://docs.rs/"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            BrowserEvent::TabActivated {
                tab_id: 9,
                url: Some("https://docs.rs/".to_string())
            }
        );
    }

    #[test]
    fn test_encode_set_icon() {
        let value = serde_json::to_value(UiCommand::set_icon(2, IconSet::Safe)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "command": "setIcon",
                "tabId": 2,
                "iconSet": "safe",
                "path": {
                    "16": "icons/safe/safe-16.png",
                    "32": "icons/safe/safe-32.png",
                    "48": "icons/safe/safe-48.png",
                    "128": "icons/safe/safe-128.png"
                }
            })
        );
    }
}
