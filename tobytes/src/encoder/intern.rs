// Copyright 2015-2023 Swim Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use tobytes_model::Object;
use tobytes_msgpack::{
    read_token, write_array_header, write_ext, write_map_header, write_uint, Token,
};

use super::{write_scalar, Encoder};
use crate::error::EngineError;
use crate::policy::{InternEquality, InterningMode};
use crate::INTERN_EXT;

/// Approximate size of one intern reference on the wire (ext header plus a
/// small uint index).
const REFERENCE_COST: usize = 3;

/// Approximate per-entry share of the table framing.
const ENTRY_OVERHEAD: usize = 4;

/// Encode an object behind an intern table. When no sub-tree is worth
/// interning the object is encoded plainly, without the table envelope.
pub(super) fn encode_with_table(
    encoder: &mut Encoder<'_>,
    object: &Object,
) -> Result<Vec<u8>, EngineError> {
    let mut classes = Classes::new(&encoder.options.intern_equality);
    collect_candidates(object, &mut classes)?;
    let mut plan = match Plan::select(encoder.options.interning, classes) {
        Some(plan) => plan,
        None => {
            let mut buffer = Vec::new();
            encoder.write_object(&mut buffer, object)?;
            return Ok(buffer);
        }
    };

    assign_entries(encoder, &mut plan, object)?;
    let mut body = Vec::new();
    emit_substituted(encoder, &plan, &mut body, object, None)?;

    let mut payload = Vec::new();
    write_array_header(&mut payload, plan.entries.len())?;
    for entry in &plan.entries {
        payload.extend_from_slice(entry);
    }
    payload.extend_from_slice(&body);
    let mut message = Vec::new();
    write_ext(&mut message, INTERN_EXT, &payload)?;
    Ok(message)
}

/// Intern candidates grouped into equality classes, keyed by the canonical
/// msgpack bytes of the sub-tree.
struct Classes<'o> {
    equality: &'o InternEquality,
    class_of: HashMap<Vec<u8>, usize>,
    classes: Vec<ClassInfo<'o>>,
}

struct ClassInfo<'o> {
    representative: &'o Object,
    size: usize,
    count: usize,
}

impl<'o> Classes<'o> {
    fn new(equality: &'o InternEquality) -> Self {
        Classes {
            equality,
            class_of: HashMap::new(),
            classes: Vec::new(),
        }
    }

    fn note(&mut self, object: &'o Object) -> Result<(), EngineError> {
        let key = canonical_bytes(object)?;
        if let Some(&class) = self.class_of.get(&key) {
            self.classes[class].count += 1;
            return Ok(());
        }
        if let InternEquality::Predicate(equal) = self.equality {
            for (index, info) in self.classes.iter_mut().enumerate() {
                if equal.as_ref()(info.representative, object) {
                    info.count += 1;
                    self.class_of.insert(key, index);
                    return Ok(());
                }
            }
        }
        let index = self.classes.len();
        self.classes.push(ClassInfo {
            representative: object,
            size: key.len(),
            count: 1,
        });
        self.class_of.insert(key, index);
        Ok(())
    }
}

/// Interning operates on whole sub-trees: a repeated text, blob, sequence or
/// mapping is a candidate, values nested inside it are only candidates in
/// their own right. Sub-trees containing custom values are never candidates.
fn candidate_shape(object: &Object) -> bool {
    matches!(
        object,
        Object::Text(_) | Object::Data(_) | Object::Sequence(_) | Object::Mapping(_)
    )
}

fn collect_candidates<'o>(
    object: &'o Object,
    classes: &mut Classes<'o>,
) -> Result<(), EngineError> {
    match object {
        Object::Text(_) | Object::Data(_) => classes.note(object)?,
        Object::Sequence(items) => {
            if object.is_native() {
                classes.note(object)?;
            }
            for item in items {
                collect_candidates(item, classes)?;
            }
        }
        Object::Mapping(entries) => {
            if object.is_native() {
                classes.note(object)?;
            }
            for (key, value) in entries {
                collect_candidates(key, classes)?;
                collect_candidates(value, classes)?;
            }
        }
        _ => {}
    }
    Ok(())
}

struct Plan {
    selected: HashMap<Vec<u8>, usize>,
    assigned: HashMap<usize, usize>,
    in_progress: HashSet<usize>,
    entries: Vec<Vec<u8>>,
}

impl Plan {
    /// Pick the classes worth interning. Returns `None` when no class
    /// qualifies, in which case no table is emitted.
    fn select(mode: InterningMode, classes: Classes<'_>) -> Option<Plan> {
        let Classes {
            class_of,
            classes: infos,
            ..
        } = classes;
        let chosen: HashSet<usize> = infos
            .iter()
            .enumerate()
            .filter(|(_, info)| info.count >= 2 && worthwhile(mode, info))
            .map(|(index, _)| index)
            .collect();
        if chosen.is_empty() {
            return None;
        }
        debug!(classes = chosen.len(), "Building an intern table.");
        let selected = class_of
            .into_iter()
            .filter(|(_, class)| chosen.contains(class))
            .collect();
        Some(Plan {
            selected,
            assigned: HashMap::new(),
            in_progress: HashSet::new(),
            entries: Vec::new(),
        })
    }
}

fn worthwhile(mode: InterningMode, info: &ClassInfo<'_>) -> bool {
    match mode {
        InterningMode::Disabled => false,
        InterningMode::AllRepeats => true,
        InterningMode::CostModel => {
            info.size * (info.count - 1) > REFERENCE_COST * info.count + ENTRY_OVERHEAD
        }
    }
}

/// Walk the object depth first, encoding an entry for each selected class
/// at its first occurrence. Children are assigned before their parents, so
/// every entry references only earlier entries.
fn assign_entries(
    encoder: &mut Encoder<'_>,
    plan: &mut Plan,
    object: &Object,
) -> Result<(), EngineError> {
    match object {
        Object::Sequence(items) => {
            for item in items {
                assign_entries(encoder, plan, item)?;
            }
        }
        Object::Mapping(entries) => {
            for (key, value) in entries {
                assign_entries(encoder, plan, key)?;
                assign_entries(encoder, plan, value)?;
            }
        }
        _ => {}
    }
    if candidate_shape(object) && object.is_native() {
        let key = canonical_bytes(object)?;
        if let Some(class) = plan.selected.get(&key).copied() {
            if !plan.assigned.contains_key(&class) {
                plan.in_progress.insert(class);
                let mut entry = Vec::new();
                emit_substituted(encoder, plan, &mut entry, object, Some(class))?;
                plan.in_progress.remove(&class);
                if sole_reference(&entry) {
                    warn!("An intern table entry consists solely of a reference.");
                }
                let index = plan.entries.len();
                plan.entries.push(entry);
                plan.assigned.insert(class, index);
            }
        }
    }
    Ok(())
}

/// Encode an object, replacing every selected sub-tree with a reference to
/// its table entry. `defining` suppresses the substitution at the root of
/// the entry currently being encoded; hitting that class again below the
/// root means the candidate graph is cyclic.
fn emit_substituted(
    encoder: &mut Encoder<'_>,
    plan: &Plan,
    buffer: &mut Vec<u8>,
    object: &Object,
    defining: Option<usize>,
) -> Result<(), EngineError> {
    if candidate_shape(object) && object.is_native() {
        let key = canonical_bytes(object)?;
        if let Some(class) = plan.selected.get(&key).copied() {
            if defining != Some(class) {
                return match plan.assigned.get(&class) {
                    Some(index) => write_reference(buffer, *index),
                    None => Err(EngineError::CyclicInternGraph),
                };
            }
        }
    }
    match object {
        Object::Sequence(items) => {
            write_array_header(buffer, items.len())?;
            for item in items {
                emit_substituted(encoder, plan, buffer, item, None)?;
            }
            Ok(())
        }
        Object::Mapping(entries) => {
            write_map_header(buffer, entries.len())?;
            for (key, value) in entries {
                emit_substituted(encoder, plan, buffer, key, None)?;
                emit_substituted(encoder, plan, buffer, value, None)?;
            }
            Ok(())
        }
        Object::Custom(custom) => encoder.write_custom(buffer, custom),
        Object::Raw(raw) => super::write_raw(buffer, raw),
        scalar => write_scalar(buffer, scalar),
    }
}

fn write_reference(buffer: &mut Vec<u8>, index: usize) -> Result<(), EngineError> {
    let mut payload = Vec::new();
    write_uint(&mut payload, index as u64)?;
    write_ext(buffer, INTERN_EXT, &payload)?;
    Ok(())
}

fn sole_reference(entry: &[u8]) -> bool {
    let mut input = entry;
    matches!(
        read_token(&mut input),
        Ok(Token::Ext(ext)) if ext.code == INTERN_EXT
    ) && input.is_empty()
}

/// The canonical msgpack bytes of a native sub-tree, as used for the default
/// intern equality. Mapping entries keep their construction order.
fn canonical_bytes(object: &Object) -> Result<Vec<u8>, EngineError> {
    let mut buffer = Vec::new();
    write_canonical(&mut buffer, object)?;
    Ok(buffer)
}

fn write_canonical(buffer: &mut Vec<u8>, object: &Object) -> Result<(), EngineError> {
    match object {
        Object::Sequence(items) => {
            write_array_header(buffer, items.len())?;
            for item in items {
                write_canonical(buffer, item)?;
            }
            Ok(())
        }
        Object::Mapping(entries) => {
            write_map_header(buffer, entries.len())?;
            for (key, value) in entries {
                write_canonical(buffer, key)?;
                write_canonical(buffer, value)?;
            }
            Ok(())
        }
        Object::Custom(_) | Object::Raw(_) => {
            unreachable!("custom values are not intern candidates")
        }
        scalar => write_scalar(buffer, scalar),
    }
}
