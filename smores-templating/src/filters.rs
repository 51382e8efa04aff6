//! The `fallback` filter.
//!
//! Every expanded tag ends in `| fallback: '<default>'`. The filter applies the
//! finalization rules to whatever the path resolved to:
//!
//! - nil or missing: the default
//! - a record: its default-display field, or `""` when it has none
//! - a list: the concatenated default displays of its elements
//! - a scalar: unchanged

use crate::expand::FALLBACK_FILTER;
use liquid::model::{Value, ValueView};
use liquid_core::parser::{
    Filter, FilterArguments, FilterReflection, ParameterReflection, ParseFilter,
};
use liquid_core::runtime::Expression;
use liquid_core::{Error, Runtime};
use std::fmt;
use std::sync::Arc;

/// Parser-side registration of the `fallback` filter.
#[derive(Debug, Clone)]
pub struct FallbackFilterParser {
    display_key: Arc<str>,
}

impl FallbackFilterParser {
    pub fn new(display_key: impl Into<Arc<str>>) -> Self {
        Self {
            display_key: display_key.into(),
        }
    }
}

impl FilterReflection for FallbackFilterParser {
    fn name(&self) -> &str {
        FALLBACK_FILTER
    }

    fn description(&self) -> &str {
        "Finalizes a resolved value, using the argument when nothing resolved"
    }

    fn positional_parameters(&self) -> &'static [ParameterReflection] {
        &[]
    }

    fn keyword_parameters(&self) -> &'static [ParameterReflection] {
        &[]
    }
}

impl ParseFilter for FallbackFilterParser {
    fn parse(&self, mut arguments: FilterArguments<'_>) -> liquid_core::Result<Box<dyn Filter>> {
        let default = arguments.positional.next();
        if arguments.positional.next().is_some() {
            return Err(Error::with_msg("fallback takes at most one argument"));
        }
        if arguments.keyword.next().is_some() {
            return Err(Error::with_msg("fallback takes no keyword arguments"));
        }
        Ok(Box::new(FallbackFilter {
            default,
            display_key: Arc::clone(&self.display_key),
        }))
    }

    fn reflection(&self) -> &dyn FilterReflection {
        self
    }
}

/// A parsed `fallback` invocation.
#[derive(Debug)]
pub struct FallbackFilter {
    default: Option<Expression>,
    display_key: Arc<str>,
}

impl fmt::Display for FallbackFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(FALLBACK_FILTER)
    }
}

impl Filter for FallbackFilter {
    fn evaluate(&self, input: &dyn ValueView, runtime: &dyn Runtime) -> liquid_core::Result<Value> {
        if input.is_nil() {
            let default = match &self.default {
                Some(expr) => expr.evaluate(runtime)?.render().to_string(),
                None => String::new(),
            };
            return Ok(Value::scalar(default));
        }
        if input.as_scalar().is_some() {
            return Ok(input.to_value());
        }
        Ok(Value::scalar(finalize(input, &self.display_key)))
    }
}

/// Text of a resolved container under the finalization rules.
pub fn finalize(value: &dyn ValueView, display_key: &str) -> String {
    if let Some(array) = value.as_array() {
        return array
            .values()
            .map(|item| display_of(item, display_key))
            .collect();
    }
    display_of(value, display_key)
}

fn display_of(value: &dyn ValueView, display_key: &str) -> String {
    if value.is_nil() {
        return String::new();
    }
    match value.as_object() {
        Some(object) => object
            .get(display_key)
            .filter(|display| !display.is_nil())
            .map(|display| display.render().to_string())
            .unwrap_or_default(),
        None => value.render().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquid::model::Object;

    fn record(fields: &[(&str, &str)]) -> Value {
        let mut object = Object::new();
        for (k, v) in fields {
            object.insert(k.to_string().into(), Value::scalar(v.to_string()));
        }
        Value::Object(object)
    }

    #[test]
    fn finalize_record_uses_display_field() {
        let value = record(&[("name", "Rex"), ("_default_template", "Dog: Rex")]);
        assert_eq!(finalize(&value, "_default_template"), "Dog: Rex");
    }

    #[test]
    fn finalize_record_without_display_is_empty() {
        let value = record(&[("lat", "1.0")]);
        assert_eq!(finalize(&value, "_default_template"), "");
    }

    #[test]
    fn finalize_list_concatenates() {
        let value = Value::Array(vec![
            record(&[("_default_template", "a")]),
            record(&[("name", "no display")]),
            record(&[("_default_template", "b")]),
        ]);
        assert_eq!(finalize(&value, "_default_template"), "ab");
    }

    #[test]
    fn finalize_scalar_list_joins_values() {
        let value = Value::Array(vec![Value::scalar("x"), Value::Nil, Value::scalar(2)]);
        assert_eq!(finalize(&value, "_default_template"), "x2");
    }

    #[test]
    fn reflection_names_the_filter() {
        let parser = FallbackFilterParser::new("_default_template");
        assert_eq!(parser.reflection().name(), "fallback");
    }
}
