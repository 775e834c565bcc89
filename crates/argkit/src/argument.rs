use crate::error::{ArgError, Result};
use crate::value::{ArgKind, ArgValue, Sequence, Slot, TypedCell, Value, ValueCell};

/// One declared argument: its names, flags and value cell.
#[derive(Debug)]
pub struct Argument {
    long_name: String,
    short_name: Option<char>,
    description: String,
    positional: bool,
    multi_value: bool,
    min_values: Option<usize>,
    default: Option<Value>,
    initialized: bool,
    cell: TypedCell,
}

impl Argument {
    pub(crate) fn new(
        kind: ArgKind,
        long_name: String,
        short_name: Option<char>,
        description: String,
    ) -> Self {
        Self {
            long_name,
            short_name,
            description,
            positional: false,
            multi_value: false,
            min_values: None,
            default: None,
            initialized: false,
            cell: TypedCell::new(kind),
        }
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> ArgKind {
        self.cell.kind()
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn is_multi_value(&self) -> bool {
        self.multi_value
    }

    /// Minimum number of values, if one was configured.
    pub fn min_values(&self) -> Option<usize> {
        self.min_values
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether a value has been stored by a parse, a default or the caller.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of values held by a multi-value argument.
    pub fn count(&self) -> usize {
        self.cell.len()
    }

    pub fn cell(&self) -> &TypedCell {
        &self.cell
    }

    /// Typed view of the cell.
    pub fn typed<T: ArgValue>(&self) -> Result<&ValueCell<T>> {
        T::cell(&self.cell).ok_or_else(|| self.mismatch(T::KIND))
    }

    fn typed_mut<T: ArgValue>(&mut self) -> Result<&mut ValueCell<T>> {
        let requested = T::KIND;
        let declared = self.kind();
        let name = self.long_name.clone();
        T::cell_mut(&mut self.cell).ok_or(ArgError::TypeMismatch {
            name,
            declared,
            requested,
        })
    }

    fn mismatch(&self, requested: ArgKind) -> ArgError {
        ArgError::TypeMismatch {
            name: self.long_name.clone(),
            declared: self.kind(),
            requested,
        }
    }

    /// Read value `index` (0 for single-value arguments).
    pub fn get<T: ArgValue>(&self, index: usize) -> Result<T> {
        let cell = self.typed::<T>()?;
        cell.get(index).ok_or_else(|| ArgError::IndexOutOfRange {
            name: self.long_name.clone(),
            index,
            len: cell.len(),
        })
    }

    pub(crate) fn set_positional(&mut self, positional: bool) {
        self.positional = positional;
    }

    pub(crate) fn set_multi_value(&mut self, min_values: Option<usize>) {
        self.multi_value = true;
        self.min_values = min_values;
        self.cell.set_multi_value();
    }

    /// Record `value` as the default and store it right away.
    ///
    /// A multi-value argument receives `min_values` copies (none when no
    /// minimum is set).
    pub(crate) fn set_default(&mut self, value: Value) -> Result<()> {
        if value.kind() != self.kind() {
            return Err(ArgError::Configuration(format!(
                "default of type {} does not match argument '--{}' of type {}",
                value.kind(),
                self.long_name,
                self.kind()
            )));
        }
        self.cell.apply_default(&value, self.min_values.unwrap_or(0))?;
        self.default = Some(value);
        self.initialized = true;
        Ok(())
    }

    pub(crate) fn store_value<T: ArgValue>(&mut self, slot: &Slot<T>) -> Result<()> {
        if self.kind() != T::KIND {
            return Err(self.storage_mismatch(T::KIND));
        }
        self.typed_mut::<T>()?.bind_slot(slot.clone());
        Ok(())
    }

    pub(crate) fn store_values<T: ArgValue>(&mut self, sequence: &Sequence<T>) -> Result<()> {
        if self.kind() != T::KIND {
            return Err(self.storage_mismatch(T::KIND));
        }
        self.typed_mut::<T>()?.bind_sequence(sequence.clone());
        Ok(())
    }

    fn storage_mismatch(&self, requested: ArgKind) -> ArgError {
        ArgError::Configuration(format!(
            "cannot bind {requested} storage to argument '--{}' of type {}",
            self.long_name,
            self.kind()
        ))
    }

    /// Store a caller-supplied value as if it had been parsed.
    pub(crate) fn seed<T: ArgValue>(&mut self, value: T) -> Result<()> {
        self.typed_mut::<T>()?.append(value);
        self.initialized = true;
        Ok(())
    }

    /// Convert `text` and store it.
    pub(crate) fn parse_value(&mut self, text: &str) -> Result<()> {
        if !self.cell.parse_and_append(text) {
            return Err(ArgError::ValueFormat {
                name: self.long_name.clone(),
                value: text.to_string(),
                kind: self.kind(),
            });
        }
        self.initialized = true;
        Ok(())
    }

    /// Store `true` for a flag named without a value.
    pub(crate) fn set_present(&mut self) -> Result<()> {
        self.seed(true)
    }

    /// Multi-value arguments with a minimum must hold at least that many values.
    pub(crate) fn has_enough_values(&self) -> bool {
        !self.multi_value || self.min_values.is_none_or(|min| self.count() >= min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(kind: ArgKind) -> Argument {
        Argument::new(kind, "param".to_string(), Some('p'), String::new())
    }

    #[test]
    fn default_marks_initialized_and_is_readable() {
        let mut a = arg(ArgKind::Int);
        assert!(!a.is_initialized());
        a.set_default(Value::Int(5)).unwrap();
        assert!(a.is_initialized());
        assert!(a.has_default());
        assert_eq!(a.get::<i32>(0).unwrap(), 5);
    }

    #[test]
    fn default_of_wrong_kind_is_configuration_error() {
        let mut a = arg(ArgKind::Int);
        let err = a.set_default(Value::from("five")).unwrap_err();
        assert!(err.is_configuration());
        assert!(!a.is_initialized());
        assert!(!a.has_default());
    }

    #[test]
    fn multi_value_default_is_replicated_min_times() {
        let mut a = arg(ArgKind::String);
        a.set_multi_value(Some(3));
        a.set_default(Value::from("x")).unwrap();
        assert_eq!(a.count(), 3);
        assert_eq!(a.get::<String>(2).unwrap(), "x");

        let mut b = arg(ArgKind::String);
        b.set_multi_value(None);
        b.set_default(Value::from("x")).unwrap();
        assert_eq!(b.count(), 0);
        assert!(b.is_initialized());
    }

    #[test]
    fn parse_value_reports_format_errors_with_name() {
        let mut a = arg(ArgKind::Int);
        let err = a.parse_value("abc").unwrap_err();
        assert_eq!(
            err,
            ArgError::ValueFormat {
                name: "param".to_string(),
                value: "abc".to_string(),
                kind: ArgKind::Int,
            }
        );
        assert!(!a.is_initialized());
    }

    #[test]
    fn typed_read_of_wrong_kind_is_mismatch() {
        let a = arg(ArgKind::Bool);
        let err = a.get::<String>(0).unwrap_err();
        assert!(matches!(err, ArgError::TypeMismatch { declared: ArgKind::Bool, requested: ArgKind::String, .. }));
    }

    #[test]
    fn indexed_read_past_end_is_out_of_range() {
        let mut a = arg(ArgKind::Int);
        a.set_multi_value(None);
        a.parse_value("1").unwrap();
        a.parse_value("2").unwrap();
        assert_eq!(a.get::<i32>(1).unwrap(), 2);
        assert_eq!(
            a.get::<i32>(2).unwrap_err(),
            ArgError::IndexOutOfRange {
                name: "param".to_string(),
                index: 2,
                len: 2,
            }
        );
    }

    #[test]
    fn binding_storage_of_wrong_kind_is_configuration_error() {
        let mut a = arg(ArgKind::Int);
        let slot = Slot::new(String::new());
        assert!(a.store_value(&slot).unwrap_err().is_configuration());
        let sequence: Sequence<bool> = Sequence::new();
        assert!(a.store_values(&sequence).unwrap_err().is_configuration());
    }

    #[test]
    fn minimum_only_applies_to_multi_value() {
        let mut a = arg(ArgKind::Int);
        assert!(a.has_enough_values());
        a.set_multi_value(Some(2));
        assert!(!a.has_enough_values());
        a.parse_value("1").unwrap();
        a.parse_value("2").unwrap();
        assert!(a.has_enough_values());
    }
}
