use std::collections::HashMap;

use proptest::prelude::*;
use uri_template_re::UriTemplate;

/// Values that need no percent-encoding and contain no `/`.
fn value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.~-]{0,12}"
}

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn segmented_template(n: usize) -> String {
    let mut s = String::from("http://example.com");
    for i in 0..n {
        s.push_str(&format!("/seg{i}/{{v{i}}}"));
    }
    s
}

proptest! {
    #[test]
    fn expand_then_captures_round_trips(values in prop::collection::vec(value(), 1..6)) {
        let template = UriTemplate::new(&segmented_template(values.len())).unwrap();
        let vars: HashMap<String, &str> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("v{i}"), v.as_str()))
            .collect();
        let uri = template.expand(&vars).unwrap();
        prop_assert!(template.matches(uri.as_str()));

        let captures = template.captures(uri.as_str());
        prop_assert_eq!(captures.len(), values.len());
        for (i, m) in captures.iter().enumerate() {
            prop_assert_eq!(m.name(), format!("v{i}"));
            prop_assert_eq!(m.value(), values[i].as_str());
        }
    }

    #[test]
    fn positional_and_named_expansion_agree(values in prop::collection::vec(value(), 0..6)) {
        let template = UriTemplate::new(&segmented_template(values.len())).unwrap();
        let vars: HashMap<String, &String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("v{i}"), v))
            .collect();
        prop_assert_eq!(template.expand(&vars).unwrap(), template.expand(&values).unwrap());
    }

    #[test]
    fn var_names_keep_order_and_duplicates(names in prop::collection::vec(name(), 0..8)) {
        let mut s = String::from("/root");
        for name in &names {
            s.push_str(&format!("/{{{name}}}"));
        }
        let template = UriTemplate::new(&s).unwrap();
        prop_assert_eq!(template.var_names().collect::<Vec<_>>(), names.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(template.to_string(), s);
    }
}
