use serde::{Deserialize, Serialize};

/// A structured address resolved by the postal-code service.
///
/// Any field may be absent. Produced per lookup and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl AddressRecord {
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }
}
