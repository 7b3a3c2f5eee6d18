//! Identifiers for stored videos and share link rows.
//!
//! Both are random v4 UUIDs on the wire and in SQLite, kept as distinct
//! types so one cannot be looked up as the other. Public share URLs use the
//! link's slug, never its [`ShareLinkId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
            #[serde(transparent)]
            #[schema(value_type = String, format = Uuid)]
            pub struct $name(Uuid);

            impl $name {
                #[must_use]
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.hyphenated().fmt(f)
                }
            }

            /// Accepts any UUID spelling `uuid` understands; ids supplied by
            /// clients arrive here.
            impl FromStr for $name {
                type Err = uuid::Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Uuid::parse_str(s).map(Self)
                }
            }

            impl From<Uuid> for $name {
                fn from(uuid: Uuid) -> Self {
                    Self(uuid)
                }
            }
        )+
    };
}

uuid_id! {
    /// A stored clip: an upload, a trim result, or a merge result.
    VideoId;
    /// Row key of a share link.
    ShareLinkId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_differ() {
        assert_ne!(VideoId::new(), VideoId::new());
        assert_ne!(ShareLinkId::default(), ShareLinkId::default());
    }

    #[test]
    fn displays_lowercase_hyphenated() {
        let id: VideoId = "67E55044-10B1-426F-9247-BB680E5FE0C8".parse().unwrap();
        assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(id.to_string().parse::<VideoId>().unwrap(), id);
    }

    #[test]
    fn json_is_a_bare_string() {
        let id = ShareLinkId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(serde_json::from_str::<ShareLinkId>(&json).unwrap(), id);
    }

    #[test]
    fn rejects_non_uuid_text() {
        assert!("not-a-uuid".parse::<VideoId>().is_err());
        assert!("".parse::<VideoId>().is_err());
    }
}
