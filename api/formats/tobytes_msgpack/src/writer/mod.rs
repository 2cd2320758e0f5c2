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
use std::fmt::{Display, Formatter};
use std::io::Write;

use rmp::encode::ValueWriteError;

use crate::Token;

#[cfg(test)]
mod tests;

/// Writing out msgpack can fail because of an IO error or because a value
/// exceeds the limitations of the msgpack format.
#[derive(Debug)]
pub enum MsgPackWriteError {
    /// An error occurred in the underlying writer.
    IoError(std::io::Error),
    /// A string, blob or extension payload has more bytes than can be
    /// represented by a `u32`.
    PayloadTooLarge(usize),
    /// An array or map has more elements than can be represented by a `u32`.
    TooManyElements(usize),
}

impl Display for MsgPackWriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MsgPackWriteError::IoError(err) => {
                write!(f, "An error occurred writing the content: {}", err)
            }
            MsgPackWriteError::PayloadTooLarge(n) => {
                write!(f, "{} bytes is too large to encode as MessagePack.", n)
            }
            MsgPackWriteError::TooManyElements(n) => {
                write!(f, "{} elements is too many to encode as MessagePack.", n)
            }
        }
    }
}

impl std::error::Error for MsgPackWriteError {}

impl From<std::io::Error> for MsgPackWriteError {
    fn from(err: std::io::Error) -> Self {
        MsgPackWriteError::IoError(err)
    }
}

impl From<ValueWriteError> for MsgPackWriteError {
    fn from(err: ValueWriteError) -> Self {
        MsgPackWriteError::IoError(err.into())
    }
}

pub fn write_nil<W: Write>(writer: &mut W) -> Result<(), MsgPackWriteError> {
    rmp::encode::write_nil(writer)?;
    Ok(())
}

pub fn write_bool<W: Write>(writer: &mut W, value: bool) -> Result<(), MsgPackWriteError> {
    rmp::encode::write_bool(writer, value)?;
    Ok(())
}

pub fn write_int<W: Write>(writer: &mut W, value: i64) -> Result<(), MsgPackWriteError> {
    rmp::encode::write_sint(writer, value)?;
    Ok(())
}

pub fn write_uint<W: Write>(writer: &mut W, value: u64) -> Result<(), MsgPackWriteError> {
    rmp::encode::write_uint(writer, value)?;
    Ok(())
}

pub fn write_f32<W: Write>(writer: &mut W, value: f32) -> Result<(), MsgPackWriteError> {
    rmp::encode::write_f32(writer, value)?;
    Ok(())
}

pub fn write_f64<W: Write>(writer: &mut W, value: f64) -> Result<(), MsgPackWriteError> {
    rmp::encode::write_f64(writer, value)?;
    Ok(())
}

pub fn write_str<W: Write>(writer: &mut W, value: &str) -> Result<(), MsgPackWriteError> {
    if u32::try_from(value.len()).is_err() {
        return Err(MsgPackWriteError::PayloadTooLarge(value.len()));
    }
    rmp::encode::write_str(writer, value)?;
    Ok(())
}

pub fn write_bin<W: Write>(writer: &mut W, value: &[u8]) -> Result<(), MsgPackWriteError> {
    if u32::try_from(value.len()).is_err() {
        return Err(MsgPackWriteError::PayloadTooLarge(value.len()));
    }
    rmp::encode::write_bin(writer, value)?;
    Ok(())
}

pub fn write_array_header<W: Write>(writer: &mut W, len: usize) -> Result<(), MsgPackWriteError> {
    let len = u32::try_from(len).map_err(|_| MsgPackWriteError::TooManyElements(len))?;
    rmp::encode::write_array_len(writer, len)?;
    Ok(())
}

pub fn write_map_header<W: Write>(writer: &mut W, len: usize) -> Result<(), MsgPackWriteError> {
    let len = u32::try_from(len).map_err(|_| MsgPackWriteError::TooManyElements(len))?;
    rmp::encode::write_map_len(writer, len)?;
    Ok(())
}

/// Write an extension envelope with the given code and payload bytes.
pub fn write_ext<W: Write>(
    writer: &mut W,
    code: i8,
    payload: &[u8],
) -> Result<(), MsgPackWriteError> {
    let len =
        u32::try_from(payload.len()).map_err(|_| MsgPackWriteError::PayloadTooLarge(payload.len()))?;
    rmp::encode::write_ext_meta(writer, len, code)?;
    writer.write_all(payload)?;
    Ok(())
}

/// Write a single token. Array and map headers only introduce the container;
/// the caller is responsible for writing the contained elements.
pub fn write_token<W: Write>(writer: &mut W, token: &Token) -> Result<(), MsgPackWriteError> {
    match token {
        Token::Nil => write_nil(writer),
        Token::Bool(value) => write_bool(writer, *value),
        Token::Int(value) => write_int(writer, *value),
        Token::UInt(value) => write_uint(writer, *value),
        Token::F32(value) => write_f32(writer, *value),
        Token::F64(value) => write_f64(writer, *value),
        Token::Str(value) => write_str(writer, value),
        Token::Bin(value) => write_bin(writer, value),
        Token::ArrayHeader(len) => write_array_header(writer, *len as usize),
        Token::MapHeader(len) => write_map_header(writer, *len as usize),
        Token::Ext(ext) => write_ext(writer, ext.code, &ext.payload),
    }
}
