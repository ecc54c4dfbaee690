//! Property tests for the template resolver's never-fails contract.

use brickflow::context::FlowContext;
use brickflow::template::{filters, render, resolve};
use proptest::prelude::*;
use serde_json::json;

fn any_context() -> FlowContext {
    FlowContext::new(
        "prop",
        json!({
            "name": "ada",
            "nested": {"list": [1, 2, 3], "flag": true},
            "empty": "",
        }),
    )
}

proptest! {
    /// Arbitrary input never panics and mixed-content rendering always
    /// yields a string; unmatched syntax must survive verbatim.
    #[test]
    fn render_is_total(input in ".{0,200}") {
        let ctx = any_context();
        let _ = render(&input, &ctx);
    }

    #[test]
    fn resolve_is_total_for_strings(input in ".{0,200}") {
        let ctx = any_context();
        let _ = resolve(&json!(input), &ctx);
    }

    #[test]
    fn text_without_references_is_identity(input in "[^{}]{0,200}") {
        let ctx = any_context();
        prop_assert_eq!(render(&input, &ctx), input);
    }

    #[test]
    fn unknown_filters_never_alter_the_value(name in "[a-z]{1,12}") {
        prop_assume!(!matches!(
            name.as_str(),
            "upper" | "lower" | "ucfirst" | "ucwords" | "trim" | "json" | "count"
                | "first" | "last" | "join" | "keys" | "values" | "reverse" | "sort"
                | "unique" | "date" | "datetime" | "time" | "default"
        ));
        let value = json!({"k": [1, 2]});
        prop_assert_eq!(filters::apply(value.clone(), &name), value);
    }

    /// Filters are total over arbitrary scalar inputs.
    #[test]
    fn filters_are_total(s in ".{0,60}", which in 0usize..18) {
        let names = [
            "upper", "lower", "ucfirst", "ucwords", "trim", "json", "count", "first",
            "last", "join", "keys", "values", "reverse", "sort", "unique", "date",
            "datetime", "time",
        ];
        let _ = filters::apply(json!(s), names[which]);
    }
}
