#![allow(missing_docs)]
#![allow(dead_code)]

/// A document that touches every token kind the reader produces by default.
pub const LENIENT: &str = r#"{
  // settings
  "name": "demo",
  'tags': ["a", "b"],
  count: 3,
  "ratio": 0.5,
  "when": "2020-01-02T03:04:05Z",
  "ctor": new Point(1, 2),
  "none": null
}"#;

/// Builds a larger strict-JSON document of `records` similar objects.
pub fn records(records: usize) -> String {
    let mut out = String::from("[");
    for i in 0..records {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            r#"{{"id":{i},"name":"item é {i}","price":{}.25,"tags":["x","y"],"active":{}}}"#,
            i * 3,
            i % 2 == 0
        ));
    }
    out.push(']');
    out
}
