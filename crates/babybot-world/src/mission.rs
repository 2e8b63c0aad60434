//! Mission text parsing.
//!
//! Accepts the instruction language rendered by
//! [`Instruction`]'s `Display` impl:
//!
//! ```text
//! mission  := seq
//! seq      := after (", then " after)?
//! after    := and (" after you " and)?
//! and      := atomic (" and " atomic)?
//! atomic   := "go to " obj | "open " obj | "pick up " obj
//!           | "put " obj " next to " obj
//! obj      := ("a" | "an" | "the") color? kind
//! ```
//!
//! Parsing is case-insensitive and ignores a trailing period.

use babybot_types::{Color, Instruction, ObjectDescriptor, ObjectKind};

use crate::error::WorldError;

/// Parse a mission string into an instruction tree.
///
/// # Errors
///
/// Returns [`WorldError::MissionParse`] if the text does not follow the
/// mission grammar.
pub fn parse_mission(text: &str) -> Result<Instruction, WorldError> {
    let normalized = text.trim().trim_end_matches('.').trim().to_lowercase();
    parse_sequence(&normalized).map_err(|reason| WorldError::MissionParse {
        text: text.to_owned(),
        reason,
    })
}

fn parse_sequence(text: &str) -> Result<Instruction, String> {
    match text.split_once(", then ") {
        Some((first, second)) => Ok(Instruction::before(
            parse_after(first)?,
            parse_after(second)?,
        )),
        None => parse_after(text),
    }
}

fn parse_after(text: &str) -> Result<Instruction, String> {
    match text.split_once(" after you ") {
        Some((first, second)) => Ok(Instruction::after(parse_and(first)?, parse_and(second)?)),
        None => parse_and(text),
    }
}

fn parse_and(text: &str) -> Result<Instruction, String> {
    match text.split_once(" and ") {
        Some((first, second)) => Ok(Instruction::and(parse_atomic(first)?, parse_atomic(second)?)),
        None => parse_atomic(text),
    }
}

fn parse_atomic(text: &str) -> Result<Instruction, String> {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix("go to ") {
        return Ok(Instruction::go_to(parse_object(rest)?));
    }
    if let Some(rest) = text.strip_prefix("open ") {
        let target = parse_object(rest)?;
        if target.kind != ObjectKind::Door {
            return Err(format!("only doors can be opened, got {target}"));
        }
        return Ok(Instruction::open(target));
    }
    if let Some(rest) = text.strip_prefix("pick up ") {
        let target = parse_object(rest)?;
        if !target.kind.is_portable() {
            return Err(format!("cannot pick up a {}", target.kind));
        }
        return Ok(Instruction::pickup(target));
    }
    if let Some(rest) = text.strip_prefix("put ") {
        let (moving, fixed) = rest
            .split_once(" next to ")
            .ok_or_else(|| format!("expected \"next to\" in {text:?}"))?;
        let moving = parse_object(moving)?;
        if !moving.kind.is_portable() {
            return Err(format!("cannot carry a {}", moving.kind));
        }
        return Ok(Instruction::put_next(moving, parse_object(fixed)?));
    }
    Err(format!("unknown instruction {text:?}"))
}

fn parse_object(text: &str) -> Result<ObjectDescriptor, String> {
    let mut words = text.split_whitespace();
    let article = words.next().ok_or("missing object")?;
    if !matches!(article, "a" | "an" | "the") {
        return Err(format!("expected an article, found {article:?}"));
    }
    let rest: Vec<&str> = words.collect();
    let (color, kind) = match rest.as_slice() {
        [kind] => (None, *kind),
        [color, kind] => (
            Some(Color::from_name(color).ok_or_else(|| format!("unknown color {color:?}"))?),
            *kind,
        ),
        _ => return Err(format!("malformed object reference {text:?}")),
    };
    let kind = ObjectKind::from_name(kind)
        .filter(|k| *k != ObjectKind::Wall)
        .ok_or_else(|| format!("unknown object {kind:?}"))?;
    Ok(ObjectDescriptor::new(kind, color))
}
