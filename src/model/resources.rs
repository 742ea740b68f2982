use super::pricing::{PricingInfo, format_price};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tr::tr;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Dashboard category selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Section {
    #[default]
    Instances,
    Networks,
    Volumes,
    Images,
    Keypairs,
    Pricing,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Instances,
        Section::Networks,
        Section::Volumes,
        Section::Images,
        Section::Keypairs,
        Section::Pricing,
    ];

    pub fn label(self) -> String {
        match self {
            Section::Instances => tr!("Instances"),
            Section::Networks => tr!("Networks"),
            Section::Volumes => tr!("Volumes"),
            Section::Images => tr!("Images"),
            Section::Keypairs => tr!("Key Pairs"),
            Section::Pricing => tr!("Pricing"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstancePricing {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uptime_hours: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hourly_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flavor: String,
    #[serde(default)]
    pub created: Option<String>,
    /// Addresses per network, passed through untouched.
    #[serde(default)]
    pub addresses: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pricing: InstancePricing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subnets: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shared: bool,
    #[serde(default, rename = "router:external", deserialize_with = "null_as_default")]
    pub external: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Size in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub volume_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub bootable: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Size in bytes, absent while the image is still queued.
    #[serde(default)]
    pub size: Option<u64>,
    /// Minimum disk in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_disk: u64,
    /// Minimum RAM in MB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_ram: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keypair {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fingerprint: String,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Everything one `/api/resources` call returns. Replaced as a whole on
/// every successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: Vec<Instance>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub networks: Vec<Network>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volumes: Vec<Volume>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keypairs: Vec<Keypair>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pricing_info: PricingInfo,
}

impl ResourceSnapshot {
    /// Cards shown for `section`, in backend order. The pricing section has
    /// no cards of its own.
    pub fn cards(&self, section: Section) -> Vec<ResourceCard<'_>> {
        match section {
            Section::Instances => self.instances.iter().map(ResourceCard::Instance).collect(),
            Section::Networks => self.networks.iter().map(ResourceCard::Network).collect(),
            Section::Volumes => self.volumes.iter().map(ResourceCard::Volume).collect(),
            Section::Images => self.images.iter().map(ResourceCard::Image).collect(),
            Section::Keypairs => self.keypairs.iter().map(ResourceCard::Keypair).collect(),
            Section::Pricing => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Active,
    Warning,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub tone: StatusTone,
}

/// One resource as the dashboard draws it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResourceCard<'a> {
    Instance(&'a Instance),
    Network(&'a Network),
    Volume(&'a Volume),
    Image(&'a Image),
    Keypair(&'a Keypair),
}

impl ResourceCard<'_> {
    /// Stable identity of the card; key pairs have no id and use their name.
    pub fn key(&self) -> &str {
        match self {
            ResourceCard::Instance(i) => &i.id,
            ResourceCard::Network(n) => &n.id,
            ResourceCard::Volume(v) => &v.id,
            ResourceCard::Image(i) => &i.id,
            ResourceCard::Keypair(k) => &k.name,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ResourceCard::Instance(i) => &i.name,
            ResourceCard::Network(n) => &n.name,
            ResourceCard::Volume(v) => &v.name,
            ResourceCard::Image(i) => &i.name,
            ResourceCard::Keypair(k) => &k.name,
        }
    }

    pub fn badge(&self) -> Option<StatusBadge> {
        match self {
            ResourceCard::Instance(i) => Some(StatusBadge {
                label: i.status.clone(),
                tone: if i.status == "ACTIVE" {
                    StatusTone::Active
                } else {
                    StatusTone::Neutral
                },
            }),
            ResourceCard::Network(n) => n.status.as_ref().map(|status| StatusBadge {
                label: status.clone(),
                tone: if status == "ACTIVE" {
                    StatusTone::Active
                } else {
                    StatusTone::Neutral
                },
            }),
            ResourceCard::Volume(v) => Some(StatusBadge {
                label: v.status.clone(),
                tone: tone_if(v.status.eq_ignore_ascii_case("available")),
            }),
            ResourceCard::Image(i) => Some(StatusBadge {
                label: i.status.clone(),
                tone: tone_if(i.status.eq_ignore_ascii_case("active")),
            }),
            ResourceCard::Keypair(_) => None,
        }
    }

    /// Short facts shown as chips under the title.
    pub fn metrics(&self) -> Vec<String> {
        match self {
            ResourceCard::Instance(i) => vec![
                i.flavor.clone(),
                tr!("{} hours", format!("{:.1}", i.pricing.uptime_hours)),
                format_price(i.pricing.total_cost),
            ],
            ResourceCard::Network(n) => {
                let mut metrics = Vec::new();
                if n.shared {
                    metrics.push(tr!("Shared"));
                }
                if n.external {
                    metrics.push(tr!("External"));
                }
                metrics
            }
            ResourceCard::Volume(v) => {
                let mut metrics = vec![
                    tr!("{} GB", v.size),
                    tr!("Type: {}", v.volume_type.as_deref().unwrap_or("-")),
                ];
                if v.bootable {
                    metrics.push(tr!("Bootable"));
                }
                metrics
            }
            ResourceCard::Image(i) => vec![
                tr!(
                    "{} GB",
                    format!("{:.2}", i.size.unwrap_or(0) as f64 / BYTES_PER_GIB)
                ),
                tr!("{}MB RAM, {}GB Disk", i.min_ram, i.min_disk),
            ],
            ResourceCard::Keypair(_) => Vec::new(),
        }
    }

    /// Longer lines shown below the metrics.
    pub fn details(&self) -> Vec<String> {
        match self {
            ResourceCard::Instance(_) | ResourceCard::Image(_) => Vec::new(),
            ResourceCard::Network(n) => {
                let mut details = vec![tr!("ID: {}", n.id)];
                if !n.subnets.is_empty() {
                    details.push(tr!("Subnets: {}", n.subnets.len()));
                }
                details
            }
            ResourceCard::Volume(v) => {
                if v.attachments.is_empty() {
                    Vec::new()
                } else {
                    vec![tr!("Attachments: {}", v.attachments.len())]
                }
            }
            ResourceCard::Keypair(k) => vec![
                tr!("Fingerprint: {}", k.fingerprint),
                tr!("Created: {}", format_timestamp(k.created_at.as_deref())),
            ],
        }
    }
}

fn tone_if(active: bool) -> StatusTone {
    if active {
        StatusTone::Active
    } else {
        StatusTone::Warning
    }
}

/// Renders a backend timestamp in local time. OpenStack services send both
/// RFC 3339 and zone-less UTC timestamps; anything else is shown as is.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return tr!("unknown");
    };
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        });
    match parsed {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

// Backends send `null` for unset fields as often as they omit them.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Cinder reports `bootable` as the string "true"/"false".
fn deserialize_loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseBool {
        Bool(bool),
        Text(String),
        Null(()),
    }

    Ok(match LooseBool::deserialize(deserializer)? {
        LooseBool::Bool(b) => b,
        LooseBool::Text(s) => s.eq_ignore_ascii_case("true"),
        LooseBool::Null(()) => false,
    })
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
