use parser::parse_with_private_names;
use serde_json::Value;

const TEMPLATES: &[&str] = &[
    "class A { %s }",
    "class A { %s; }",
    "class A { %s; #y() {} }",
    "class A { %s;a() {} }",
    "class A { %s\na() {} }",
];

/// First class element of the first statement
fn first_element(source: &str) -> Value {
    let program = match parse_with_private_names(source) {
        Ok(program) => program,
        Err(err) => panic!("`{}` failed: {}", source, err),
    };
    let json = serde_json::to_value(&program).unwrap();
    json["body"][0]["body"]["body"][0].clone()
}

#[test]
fn test_private_method_key_shape() {
    for template in TEMPLATES {
        let source = template.replace("%s", "#x() {}");
        let element = first_element(&source);
        assert_eq!(element["type"], "MethodDefinition", "{}", source);
        assert_eq!(element["kind"], "method");
        assert_eq!(element["key"]["type"], "PrivateName");
        assert_eq!(element["key"]["name"], "x");
        assert_eq!(element["key"]["span"]["start"]["offset"], 10);
        assert_eq!(element["key"]["span"]["end"]["offset"], 12);
        assert_eq!(element["value"]["type"], "FunctionExpression");
        assert_eq!(element["value"]["span"]["start"]["offset"], 12);
    }
}

#[test]
fn test_private_getter_key_shape() {
    for template in TEMPLATES {
        let source = template.replace("%s", "get #x() {}");
        let element = first_element(&source);
        assert_eq!(element["type"], "MethodDefinition", "{}", source);
        assert_eq!(element["kind"], "get");
        assert_eq!(element["span"]["start"]["offset"], 10);
        assert_eq!(element["key"]["type"], "PrivateName");
        assert_eq!(element["key"]["name"], "x");
        assert_eq!(element["key"]["span"]["start"]["offset"], 14);
        assert_eq!(element["key"]["span"]["end"]["offset"], 16);
    }
}

#[test]
fn test_private_member_expression_shape() {
    let source = "class A { #x; m() { return this.#x } }";
    let program = parse_with_private_names(source).unwrap();
    let json = serde_json::to_value(&program).unwrap();

    let field = &json["body"][0]["body"]["body"][0];
    assert_eq!(field["type"], "PropertyDefinition");
    assert_eq!(field["key"]["type"], "PrivateName");
    assert!(field["value"].is_null());

    let method = &json["body"][0]["body"]["body"][1];
    let member = &method["value"]["body"][0]["argument"];
    assert_eq!(member["type"], "MemberExpression");
    assert_eq!(member["computed"], false);
    assert_eq!(member["property"]["type"], "PrivateName");
    assert_eq!(member["property"]["name"], "x");
    assert_eq!(member["property"]["span"]["start"]["offset"], 32);
}

#[test]
fn test_private_member_destructuring_target_shape() {
    let source = "class A { #x; m(a) { [this.#x] = a } }";
    let program = parse_with_private_names(source).unwrap();
    let json = serde_json::to_value(&program).unwrap();

    let method = &json["body"][0]["body"]["body"][1];
    let assignment = &method["value"]["body"][0]["expression"];
    assert_eq!(assignment["type"], "AssignmentExpression");
    let target = &assignment["left"]["Pattern"]["elements"][0];
    assert_eq!(target["type"], "MemberExpression");
    assert_eq!(target["expression"]["type"], "MemberExpression");
    assert_eq!(target["expression"]["property"]["type"], "PrivateName");
    assert_eq!(target["expression"]["property"]["name"], "x");
}

#[test]
fn test_element_counts_per_template() {
    let expected = [1, 1, 2, 2, 2];
    for (template, count) in TEMPLATES.iter().zip(expected) {
        let source = template.replace("%s", "#x() {}");
        let program = parse_with_private_names(&source).unwrap();
        let json = serde_json::to_value(&program).unwrap();
        let elements = json["body"][0]["body"]["body"].as_array().unwrap();
        assert_eq!(elements.len(), count, "{}", source);
    }
}
