//! Identifiers used by the chat platform.
//!
//! All ids are plain `u64` snowflakes wrapped in newtypes so a role id cannot be
//! passed where a channel id is expected. They serialize as bare numbers (or as
//! strings when used as JSON object keys).

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $mention:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Formats the id the way the platform renders a mention of it.
            pub fn mention(&self) -> String {
                format!($mention, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            /// Parses either a bare id or a mention of it.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s
                    .trim_start_matches('<')
                    .trim_start_matches(['@', '#'])
                    .trim_start_matches(['&', '!'])
                    .trim_end_matches('>');
                trimmed.parse::<u64>().map($name)
            }
        }
    };
}

id_type!(
    /// Identifier of a guild (a chat server).
    GuildId,
    "{}"
);
id_type!(
    /// Identifier of a guild member.
    MemberId,
    "<@{}>"
);
id_type!(
    /// Identifier of a channel.
    ChannelId,
    "<#{}>"
);
id_type!(
    /// Identifier of a role.
    RoleId,
    "<@&{}>"
);
