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

use std::convert::TryFrom;

use tobytes_model::Object;


/// The entries of the active intern table, growing as they are decoded.
/// Entry `i` is only visible to entries after it and to the table body.
#[derive(Debug, Default)]
pub struct InternFrame {
    entries: Vec<Object>,
}

impl InternFrame {
    pub fn new() -> Self {
        InternFrame::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: Object) {
        self.entries.push(entry);
    }

    pub fn get(&self, index: u64) -> Option<&Object> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.entries.get(index))
    }
}

#[derive(Debug)]
struct NamespaceBinding {
    name: String,
    id: u64,
}

/// The lexical stack of namespace-id bindings. Frames are properly nested;
/// an inner binding of a namespace string shadows every outer binding of the
/// same string, taking any shadowed ids out of scope with it. Names are
/// never shadowed.
#[derive(Debug, Default)]
pub struct NamespaceScope {
    bindings: Vec<NamespaceBinding>,
}

impl NamespaceScope {
    pub fn new() -> Self {
        NamespaceScope::default()
    }

    pub fn push<N: Into<String>>(&mut self, name: N, id: u64) {
        self.bindings.push(NamespaceBinding {
            name: name.into(),
            id,
        });
    }

    pub fn pop(&mut self) {
        self.bindings.pop();
    }

    /// Resolve an integer id to the namespace bound to it by the innermost
    /// live binding.
    pub fn resolve_id(&self, id: u64) -> Option<&str> {
        let mut shadowed: Vec<&str> = Vec::new();
        for binding in self.bindings.iter().rev() {
            if binding.id == id && !shadowed.contains(&binding.name.as_str()) {
                return Some(binding.name.as_str());
            }
            shadowed.push(binding.name.as_str());
        }
        None
    }

    /// Resolve a namespace string to the id of its innermost binding. The id
    /// is only usable when it still resolves back to the same namespace; an
    /// id recaptured by an inner binding of another namespace is withheld.
    pub fn resolve_name(&self, name: &str) -> Option<u64> {
        let id = self
            .bindings
            .iter()
            .rev()
            .find(|binding| binding.name == name)?
            .id;
        (self.resolve_id(id) == Some(name)).then_some(id)
    }
}
