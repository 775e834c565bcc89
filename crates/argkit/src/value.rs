//! Typed storage for argument values.
//!
//! Every argument owns exactly one [`TypedCell`], a closed sum over the three
//! supported element types. The concrete [`ValueCell<T>`] inside it is picked
//! once, at registration, so reads and writes never need to guess a type.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::ArgError;

/// Element type of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    String,
    Int,
    Bool,
}

impl ArgKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgKind {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(Self::String),
            "int" | "integer" => Ok(Self::Int),
            "bool" | "flag" => Ok(Self::Bool),
            other => Err(ArgError::Configuration(format!(
                "unsupported argument kind '{other}'"
            ))),
        }
    }
}

/// A single value of any supported kind, used for defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i32),
    Bool(bool),
}

impl Value {
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::String(_) => ArgKind::String,
            Self::Int(_) => ArgKind::Int,
            Self::Bool(_) => ArgKind::Bool,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Caller-owned storage for a single value.
///
/// Bind it with [`ArgParser::store_value`](crate::ArgParser::store_value);
/// the parser then writes through to it and reads back from it.
#[derive(Debug, Default)]
pub struct Slot<T>(Rc<RefCell<T>>);

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Clone> Slot<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }
}

/// Caller-owned storage for a multi-value sequence.
///
/// Bind it with [`ArgParser::store_values`](crate::ArgParser::store_values).
/// Values are appended in place; the parser never clears it.
#[derive(Debug, Default)]
pub struct Sequence<T>(Rc<RefCell<Vec<T>>>);

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Clone> Sequence<T> {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn borrow(&self) -> Ref<'_, Vec<T>> {
        self.0.borrow()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn push(&self, value: T) {
        self.0.borrow_mut().push(value);
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Storage for one argument's value(s).
///
/// Reads of an unset cell yield `T::default()`; whether a value was ever
/// stored is tracked by the owning argument, not here.
#[derive(Debug, Default)]
pub struct ValueCell<T> {
    value: T,
    values: Vec<T>,
    slot: Option<Slot<T>>,
    sequence: Option<Sequence<T>>,
    multi: bool,
}

impl<T: Clone + Default> ValueCell<T> {
    pub fn new() -> Self {
        Self {
            value: T::default(),
            values: Vec::new(),
            slot: None,
            sequence: None,
            multi: false,
        }
    }

    pub fn is_multi_value(&self) -> bool {
        self.multi
    }

    pub(crate) fn set_multi_value(&mut self) {
        self.multi = true;
    }

    /// Redirect single-value reads and writes to `slot`. The owned value is
    /// left as it was.
    pub(crate) fn bind_slot(&mut self, slot: Slot<T>) {
        self.slot = Some(slot);
    }

    /// Redirect multi-value reads and writes to `sequence`. Owned values are
    /// left as they were.
    pub(crate) fn bind_sequence(&mut self, sequence: Sequence<T>) {
        self.sequence = Some(sequence);
    }

    pub fn set_single(&mut self, value: T) {
        match &self.slot {
            Some(slot) => slot.set(value),
            None => self.value = value,
        }
    }

    /// Push onto the sequence of a multi-value cell, otherwise overwrite the
    /// single value.
    pub fn append(&mut self, value: T) {
        if !self.multi {
            self.set_single(value);
            return;
        }
        match &self.sequence {
            Some(sequence) => sequence.push(value),
            None => self.values.push(value),
        }
    }

    /// Number of values in the sequence (always 0 for single-value cells
    /// without a sequence).
    pub fn len(&self) -> usize {
        match &self.sequence {
            Some(sequence) => sequence.len(),
            None => self.values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the value at `index`.
    ///
    /// A multi-value cell with a populated sequence reads element `index` and
    /// returns `None` past the end. Any other cell reads its single value and
    /// ignores `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        if self.multi && !self.is_empty() {
            return match &self.sequence {
                Some(sequence) => sequence.borrow().get(index).cloned(),
                None => self.values.get(index).cloned(),
            };
        }
        Some(match &self.slot {
            Some(slot) => slot.get(),
            None => self.value.clone(),
        })
    }

    pub fn values(&self) -> Vec<T> {
        match &self.sequence {
            Some(sequence) => sequence.to_vec(),
            None => self.values.clone(),
        }
    }
}

/// The cell of one argument, tagged with its element type.
#[derive(Debug)]
pub enum TypedCell {
    String(ValueCell<String>),
    Int(ValueCell<i32>),
    Bool(ValueCell<bool>),
}

impl TypedCell {
    pub fn new(kind: ArgKind) -> Self {
        match kind {
            ArgKind::String => Self::String(ValueCell::new()),
            ArgKind::Int => Self::Int(ValueCell::new()),
            ArgKind::Bool => Self::Bool(ValueCell::new()),
        }
    }

    pub fn kind(&self) -> ArgKind {
        match self {
            Self::String(_) => ArgKind::String,
            Self::Int(_) => ArgKind::Int,
            Self::Bool(_) => ArgKind::Bool,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::String(c) => c.len(),
            Self::Int(c) => c.len(),
            Self::Bool(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn set_multi_value(&mut self) {
        match self {
            Self::String(c) => c.set_multi_value(),
            Self::Int(c) => c.set_multi_value(),
            Self::Bool(c) => c.set_multi_value(),
        }
    }

    /// Convert `text` and append it. Returns `false` when the text is not a
    /// valid value of this kind; nothing is stored in that case.
    pub(crate) fn parse_and_append(&mut self, text: &str) -> bool {
        match self {
            Self::String(c) => append_parsed(c, text),
            Self::Int(c) => append_parsed(c, text),
            Self::Bool(c) => append_parsed(c, text),
        }
    }

    /// Store `value` as a default: `copies` appends on a multi-value cell,
    /// a single write otherwise.
    pub(crate) fn apply_default(&mut self, value: &Value, copies: usize) -> Result<(), ArgError> {
        let kind = self.kind();
        match (self, value) {
            (Self::String(c), Value::String(v)) => fill(c, v, copies),
            (Self::Int(c), Value::Int(v)) => fill(c, v, copies),
            (Self::Bool(c), Value::Bool(v)) => fill(c, v, copies),
            _ => {
                return Err(ArgError::Configuration(format!(
                    "default of type {} does not fit a {} value",
                    value.kind(),
                    kind
                )));
            }
        }
        Ok(())
    }

    /// Render the readable value(s) for reporting: the sequence for a
    /// populated multi-value cell, the single value otherwise.
    pub fn snapshot(&self) -> Vec<Value> {
        fn collect<T: ArgValue>(cell: &ValueCell<T>) -> Vec<Value> {
            if cell.is_multi_value() && !cell.is_empty() {
                cell.values().into_iter().map(ArgValue::into_value).collect()
            } else {
                cell.get(0).into_iter().map(ArgValue::into_value).collect()
            }
        }
        match self {
            Self::String(c) => collect(c),
            Self::Int(c) => collect(c),
            Self::Bool(c) => collect(c),
        }
    }
}

fn append_parsed<T: ArgValue>(cell: &mut ValueCell<T>, text: &str) -> bool {
    match T::parse_text(text) {
        Some(value) => {
            cell.append(value);
            true
        }
        None => false,
    }
}

fn fill<T: Clone + Default>(cell: &mut ValueCell<T>, value: &T, copies: usize) {
    if cell.is_multi_value() {
        for _ in 0..copies {
            cell.append(value.clone());
        }
    } else {
        cell.set_single(value.clone());
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for String {}
    impl Sealed for i32 {}
    impl Sealed for bool {}
}

/// Element types an argument can hold: `String`, `i32` and `bool`.
pub trait ArgValue: Clone + Default + fmt::Debug + sealed::Sealed + 'static {
    const KIND: ArgKind;

    /// Text-to-value conversion. `None` means the text is not a valid value.
    fn parse_text(text: &str) -> Option<Self>;

    fn into_value(self) -> Value;

    fn cell(cell: &TypedCell) -> Option<&ValueCell<Self>>;

    fn cell_mut(cell: &mut TypedCell) -> Option<&mut ValueCell<Self>>;
}

impl ArgValue for String {
    const KIND: ArgKind = ArgKind::String;

    fn parse_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn cell(cell: &TypedCell) -> Option<&ValueCell<Self>> {
        match cell {
            TypedCell::String(c) => Some(c),
            _ => None,
        }
    }

    fn cell_mut(cell: &mut TypedCell) -> Option<&mut ValueCell<Self>> {
        match cell {
            TypedCell::String(c) => Some(c),
            _ => None,
        }
    }
}

impl ArgValue for i32 {
    const KIND: ArgKind = ArgKind::Int;

    fn parse_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn cell(cell: &TypedCell) -> Option<&ValueCell<Self>> {
        match cell {
            TypedCell::Int(c) => Some(c),
            _ => None,
        }
    }

    fn cell_mut(cell: &mut TypedCell) -> Option<&mut ValueCell<Self>> {
        match cell {
            TypedCell::Int(c) => Some(c),
            _ => None,
        }
    }
}

impl ArgValue for bool {
    const KIND: ArgKind = ArgKind::Bool;

    /// Only `true` and `1` are true; any other text is false, never an error.
    fn parse_text(text: &str) -> Option<Self> {
        Some(text == "true" || text == "1")
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn cell(cell: &TypedCell) -> Option<&ValueCell<Self>> {
        match cell {
            TypedCell::Bool(c) => Some(c),
            _ => None,
        }
    }

    fn cell_mut(cell: &mut TypedCell) -> Option<&mut ValueCell<Self>> {
        match cell {
            TypedCell::Bool(c) => Some(c),
            _ => None,
        }
    }
}
