use std::any::Any;

use crate::values::AttributeType;

/// How an input field is populated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    /// A single named value of the given type
    Typed(AttributeType),
    /// The whole values store, as available when the node starts
    WholeStore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub kind: InputKind,
    /// The processor falls back to its own default when nothing provides the value
    pub has_default: bool,
    /// The processor updates the value and republishes it under the same name
    pub in_place: bool,
}

/// Declared inputs of a processor.
///
/// ```
/// use report_graph::traits::InputShape;
///
/// let shape = InputShape::new()
///     .required::<String>("mapImage")
///     .optional::<u32>("dpi")
///     .whole_store("values");
///
/// assert_eq!(shape.field_names(), vec!["mapImage", "dpi", "values"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputShape {
    fields: Vec<InputField>,
}

impl InputShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required<T: Any + Send + Sync>(self, name: &str) -> Self {
        self.typed(name, AttributeType::of::<T>(), false)
    }

    pub fn optional<T: Any + Send + Sync>(self, name: &str) -> Self {
        self.typed(name, AttributeType::of::<T>(), true)
    }

    pub fn typed(mut self, name: &str, ty: AttributeType, has_default: bool) -> Self {
        self.fields.push(InputField {
            name: name.to_string(),
            kind: InputKind::Typed(ty),
            has_default,
            in_place: false,
        });
        self
    }

    pub fn in_place<T: Any + Send + Sync>(mut self, name: &str) -> Self {
        self.fields.push(InputField {
            name: name.to_string(),
            kind: InputKind::Typed(AttributeType::of::<T>()),
            has_default: false,
            in_place: true,
        });
        self
    }

    pub fn whole_store(mut self, name: &str) -> Self {
        self.fields.push(InputField {
            name: name.to_string(),
            kind: InputKind::WholeStore,
            has_default: false,
            in_place: false,
        });
        self
    }

    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputField {
    pub name: String,
    pub ty: AttributeType,
    /// Safe to rename automatically when another output already uses the name
    pub renamable: bool,
}

/// Declared outputs of a processor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputShape {
    fields: Vec<OutputField>,
}

impl OutputShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T: Any + Send + Sync>(self, name: &str) -> Self {
        self.typed(name, AttributeType::of::<T>(), false)
    }

    pub fn renamable<T: Any + Send + Sync>(self, name: &str) -> Self {
        self.typed(name, AttributeType::of::<T>(), true)
    }

    pub fn typed(mut self, name: &str, ty: AttributeType, renamable: bool) -> Self {
        self.fields.push(OutputField {
            name: name.to_string(),
            ty,
            renamable,
        });
        self
    }

    pub fn fields(&self) -> &[OutputField] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
