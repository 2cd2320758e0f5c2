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

pub mod reader;
pub mod writer;

pub use reader::{read_token, MsgPackReadError};
pub use writer::{
    write_array_header, write_bin, write_bool, write_ext, write_f32, write_f64, write_int,
    write_map_header, write_nil, write_str, write_token, write_uint, MsgPackWriteError,
};

/// A single lexical element of a msgpack stream. Array and map tokens carry
/// only the header; the caller drives the reads of the contained elements.
/// Extension tokens carry the raw envelope without any interpretation of the
/// extension code.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
    ArrayHeader(u32),
    MapHeader(u32),
    Ext(ExtToken),
}

/// A raw msgpack extension envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtToken {
    pub code: i8,
    pub payload: Vec<u8>,
}

impl ExtToken {
    pub fn new(code: i8, payload: Vec<u8>) -> Self {
        ExtToken { code, payload }
    }
}
