//! Binary layout of a saved battle.
//!
//! All integers and floats are big-endian. A file starts with the magic
//! `SKRM` and a `u16` format version, followed by both sides back to back:
//!
//! ```text
//! side      := name color:f64*4 count:u32 combatant*count
//! combatant := tag:u8 name strength:f64 health:f64 speed:f64 x:f64 y:f64 payload
//! payload   := stealth:f64                 (hobbit, wizard)
//!            | axe:u8 fury:u8              (orc)
//!            | ring:u8 hell_hawks:u8       (nazgul)
//! name      := len:u32 utf8*len
//! ```
//!
//! Files that do not start with the magic are read as the headerless layout
//! written before versioning existed.

use skirmish_core::{
    BattleRecord, CombatantKind, CombatantProfile, Health, Position, Recruit, SideColor,
    SideRecord, Speed, Stealth, Strength, Traits,
};
use thiserror::Error;

/// Leading bytes of every versioned battle file.
pub const MAGIC: [u8; 4] = *b"SKRM";
/// Version written by [`encode`].
pub const FORMAT_VERSION: u16 = 1;

/// Errors raised while encoding or decoding a battle.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended in the middle of a field.
    #[error("unexpected end of input while reading {field}")]
    Truncated {
        /// Field being read.
        field: &'static str,
    },
    /// The header names a version this build cannot read.
    #[error("unsupported format version {version}")]
    UnsupportedVersion {
        /// Version found in the header.
        version: u16,
    },
    /// A combatant carries a tag that maps to no kind.
    #[error("unknown combatant tag {tag}")]
    UnknownTag {
        /// Tag found in the input.
        tag: u8,
    },
    /// A boolean byte other than `0` or `1`.
    #[error("invalid boolean byte {value} in {field}")]
    InvalidBool {
        /// Field being read.
        field: &'static str,
        /// Byte found in the input.
        value: u8,
    },
    /// A name is not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 {
        /// Field being read.
        field: &'static str,
    },
    /// Bytes remain after both sides were read.
    #[error("{remaining} unexpected bytes after the second side")]
    TrailingBytes {
        /// Number of unread bytes.
        remaining: usize,
    },
    /// A name or roster exceeds what the layout can express.
    #[error("{field} is too long to encode")]
    TooLong {
        /// Field being written.
        field: &'static str,
    },
}

/// Serializes both sides of a battle, header included.
pub fn encode(record: &BattleRecord) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
    for side in &record.sides {
        write_side(&mut out, side)?;
    }
    Ok(out)
}

/// Reconstructs a battle from bytes produced by [`encode`] or by the
/// headerless layout. Nothing is returned unless the whole input is valid.
pub fn decode(bytes: &[u8]) -> Result<BattleRecord, CodecError> {
    let mut reader = Reader::new(bytes);
    if bytes.starts_with(&MAGIC) {
        let _ = reader.take(MAGIC.len(), "magic")?;
        let version = reader.u16("version")?;
        if version != FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion { version });
        }
    }

    let first = reader.side()?;
    let second = reader.side()?;
    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: reader.remaining(),
        });
    }

    Ok(BattleRecord {
        sides: [first, second],
    })
}

fn write_side(out: &mut Vec<u8>, side: &SideRecord) -> Result<(), CodecError> {
    write_str(out, &side.name, "side name")?;
    for channel in [
        side.color.red,
        side.color.green,
        side.color.blue,
        side.color.alpha,
    ] {
        out.extend_from_slice(&channel.to_be_bytes());
    }

    let count = u32::try_from(side.recruits.len())
        .map_err(|_| CodecError::TooLong { field: "roster" })?;
    out.extend_from_slice(&count.to_be_bytes());

    for recruit in &side.recruits {
        write_recruit(out, recruit)?;
    }
    Ok(())
}

fn write_recruit(out: &mut Vec<u8>, recruit: &Recruit) -> Result<(), CodecError> {
    let profile = &recruit.profile;
    out.push(profile.kind().tag());
    write_str(out, profile.name.as_deref().unwrap_or_default(), "combatant name")?;
    for value in [
        profile.strength.get(),
        profile.health.get(),
        profile.speed.get(),
        recruit.position.x(),
        recruit.position.y(),
    ] {
        out.extend_from_slice(&value.to_be_bytes());
    }

    match profile.traits {
        Traits::Hobbit { stealth } | Traits::Wizard { stealth } => {
            out.extend_from_slice(&stealth.get().to_be_bytes());
        }
        Traits::Orc { has_axe, has_fury } => {
            out.push(u8::from(has_axe));
            out.push(u8::from(has_fury));
        }
        Traits::Nazgul {
            has_ring_of_power,
            has_hell_hawks,
        } => {
            out.push(u8::from(has_ring_of_power));
            out.push(u8::from(has_hell_hawks));
        }
    }
    Ok(())
}

fn write_str(out: &mut Vec<u8>, value: &str, field: &'static str) -> Result<(), CodecError> {
    let len = u32::try_from(value.len()).map_err(|_| CodecError::TooLong { field })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn remaining(&self) -> usize {
        self.bytes.len()
    }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], CodecError> {
        if self.bytes.len() < len {
            return Err(CodecError::Truncated { field });
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N, field)?);
        Ok(array)
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.array::<1>(field)?[0])
    }

    fn u16(&mut self, field: &'static str) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.array(field)?))
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.array(field)?))
    }

    fn f64(&mut self, field: &'static str) -> Result<f64, CodecError> {
        Ok(f64::from_be_bytes(self.array(field)?))
    }

    fn bool(&mut self, field: &'static str) -> Result<bool, CodecError> {
        match self.u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CodecError::InvalidBool { field, value }),
        }
    }

    fn string(&mut self, field: &'static str) -> Result<String, CodecError> {
        let len =
            usize::try_from(self.u32(field)?).map_err(|_| CodecError::Truncated { field })?;
        let bytes = self.take(len, field)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8 { field })
    }

    fn side(&mut self) -> Result<SideRecord, CodecError> {
        let name = self.string("side name")?;
        let color = SideColor::new(
            self.f64("color")?,
            self.f64("color")?,
            self.f64("color")?,
            self.f64("color")?,
        );
        let count = self.u32("roster count")?;

        // The count is untrusted; grow with the input instead of reserving up front.
        let mut recruits = Vec::new();
        for _ in 0..count {
            recruits.push(self.recruit()?);
        }

        Ok(SideRecord {
            name,
            color,
            recruits,
        })
    }

    fn recruit(&mut self) -> Result<Recruit, CodecError> {
        let tag = self.u8("combatant tag")?;
        let kind = CombatantKind::from_tag(tag).ok_or(CodecError::UnknownTag { tag })?;
        let name = self.string("combatant name")?;
        let strength = Strength::new(self.f64("strength")?);
        let health = Health::new(self.f64("health")?);
        let speed = Speed::new(self.f64("speed")?);
        let position = Position::new(self.f64("position")?, self.f64("position")?);

        let traits = match kind {
            CombatantKind::Hobbit => Traits::Hobbit {
                stealth: Stealth::new(self.f64("stealth")?),
            },
            CombatantKind::Wizard => Traits::Wizard {
                stealth: Stealth::new(self.f64("stealth")?),
            },
            CombatantKind::Orc => Traits::Orc {
                has_axe: self.bool("axe")?,
                has_fury: self.bool("fury")?,
            },
            CombatantKind::Nazgul => Traits::Nazgul {
                has_ring_of_power: self.bool("ring of power")?,
                has_hell_hawks: self.bool("hell hawks")?,
            },
        };

        Ok(Recruit {
            profile: CombatantProfile {
                name: Some(name),
                health,
                strength,
                speed,
                traits,
            },
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recruit(name: &str, strength: f64, traits: Traits, x: f64, y: f64) -> Recruit {
        Recruit {
            profile: CombatantProfile {
                name: Some(name.to_owned()),
                health: Health::new(73.4),
                strength: Strength::new(strength),
                speed: Speed::new(61.2),
                traits,
            },
            position: Position::new(x, y),
        }
    }

    fn battle() -> BattleRecord {
        BattleRecord {
            sides: [
                SideRecord {
                    name: "Light".to_owned(),
                    color: SideColor::new(0.0, 1.0, 1.0, 1.0),
                    recruits: vec![
                        recruit(
                            "Frodo",
                            20.0,
                            Traits::Hobbit {
                                stealth: Stealth::new(49.0),
                            },
                            440.5,
                            170.25,
                        ),
                        recruit(
                            "Gandalf",
                            100.0,
                            Traits::Wizard {
                                stealth: Stealth::new(12.3),
                            },
                            460.0,
                            160.0,
                        ),
                        recruit(
                            "Pippin",
                            55.5,
                            Traits::Hobbit {
                                stealth: Stealth::new(50.0),
                            },
                            0.0,
                            571.0,
                        ),
                    ],
                },
                SideRecord {
                    name: "Dark".to_owned(),
                    color: SideColor::new(1.0, 0.0, 0.0, 1.0),
                    recruits: vec![
                        recruit(
                            "Uglúk",
                            100.0,
                            Traits::Orc {
                                has_axe: true,
                                has_fury: false,
                            },
                            700.0,
                            340.0,
                        ),
                        recruit(
                            "Witch-king",
                            20.0,
                            Traits::Nazgul {
                                has_ring_of_power: true,
                                has_hell_hawks: true,
                            },
                            1000.0,
                            0.0,
                        ),
                        recruit(
                            "Khamûl",
                            64.9,
                            Traits::Nazgul {
                                has_ring_of_power: false,
                                has_hell_hawks: false,
                            },
                            712.3,
                            366.6,
                        ),
                    ],
                },
            ],
        }
    }

    #[test]
    fn mixed_sides_round_trip_field_for_field() {
        let record = battle();
        let bytes = encode(&record).expect("encode");
        assert_eq!(decode(&bytes).expect("decode"), record);
    }

    #[test]
    fn header_carries_magic_and_version() {
        let bytes = encode(&battle()).expect("encode");
        assert_eq!(&bytes[..4], b"SKRM");
        assert_eq!(&bytes[4..6], &FORMAT_VERSION.to_be_bytes());
    }

    #[test]
    fn headerless_layout_is_still_readable() {
        let record = battle();
        let bytes = encode(&record).expect("encode");
        assert_eq!(decode(&bytes[6..]).expect("decode"), record);
    }

    #[test]
    fn future_versions_are_rejected() {
        let mut bytes = encode(&battle()).expect("encode");
        bytes[4..6].copy_from_slice(&2_u16.to_be_bytes());
        assert_eq!(
            decode(&bytes),
            Err(CodecError::UnsupportedVersion { version: 2 })
        );
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let mut bytes = encode(&battle()).expect("encode");
        // magic + version + name length + "Light" + four color channels + count
        let first_tag = 4 + 2 + 4 + 5 + 32 + 4;
        assert_eq!(bytes[first_tag], CombatantKind::Hobbit.tag());
        bytes[first_tag] = 9;
        assert_eq!(decode(&bytes), Err(CodecError::UnknownTag { tag: 9 }));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let bytes = encode(&battle()).expect("encode");
        for len in [0, 5, 20, bytes.len() - 1] {
            assert!(
                matches!(decode(&bytes[..len]), Err(CodecError::Truncated { .. })),
                "prefix of {len} bytes decoded"
            );
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode(&battle()).expect("encode");
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(
            decode(&bytes),
            Err(CodecError::TrailingBytes { remaining: 2 })
        );
    }

    #[test]
    fn invalid_utf8_names_are_rejected() {
        let mut bytes = encode(&battle()).expect("encode");
        bytes[10] = 0xff;
        assert_eq!(
            decode(&bytes),
            Err(CodecError::InvalidUtf8 { field: "side name" })
        );
    }

    #[test]
    fn out_of_range_stats_are_clamped_on_read() {
        let mut record = battle();
        let mut bytes = encode(&record).expect("encode");
        // tag + name length + "Frodo" lead into the strength field.
        let strength = 4 + 2 + 4 + 5 + 32 + 4 + 1 + 4 + 5;
        bytes[strength..strength + 8].copy_from_slice(&250.0_f64.to_be_bytes());

        record.sides[0].recruits[0].profile.strength = Strength::new(100.0);
        assert_eq!(decode(&bytes).expect("decode"), record);
    }
}
