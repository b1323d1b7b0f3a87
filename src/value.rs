use std::{fmt::Display, rc::Rc};

#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Nil,
    String(Rc<String>),
}

impl Value {
    /// Lox falsiness: nil and false are falsey, everything else is truthy.
    pub fn is_falsey(&self) -> bool {
        matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Number(v) => write!(f, "{}", v),
            Value::Nil => write!(f, "nil"),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}
