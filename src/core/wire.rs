use serde::Deserialize;

use crate::core::ServiceInstance;

// Shape of one entry of `GET /v1/catalog/service/:service`.
#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct CatalogServiceNode {
    pub(crate) node: String,
    pub(crate) address: String,
    #[serde(rename = "ServiceID")]
    pub(crate) service_id: String,
    pub(crate) service_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub(crate) service_tags: Vec<String>,
    pub(crate) service_address: String,
    pub(crate) service_port: u16,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<CatalogServiceNode> for ServiceInstance {
    fn from(n: CatalogServiceNode) -> Self {
        // The service address overrides the node address when the registration sets one.
        let address = if n.service_address.is_empty() {
            n.address
        } else {
            n.service_address
        };
        Self {
            node: n.node,
            address,
            port: Some(n.service_port).filter(|p| *p != 0),
            service_id: n.service_id,
            service_name: n.service_name,
            tags: n.service_tags,
        }
    }
}

pub fn decode_catalog(body: &str) -> Result<Vec<ServiceInstance>, serde_json::Error> {
    let nodes: Option<Vec<CatalogServiceNode>> = serde_json::from_str(body)?;
    Ok(nodes
        .unwrap_or_default()
        .into_iter()
        .map(ServiceInstance::from)
        .collect())
}
