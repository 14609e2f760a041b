use super::parse_with;
use parser::{parse_with_private_names, Parser, ParserOptions, PrivateNames};

fn assert_parses(source: &str) {
    if let Err(err) = parse_with_private_names(source) {
        panic!("`{}` failed: {}", source, err);
    }
}

#[test]
fn test_forward_reference_in_same_class() {
    assert_parses("class A { a() { this.#a } ; #a() {} }");
}

#[test]
fn test_getter_setter_pair() {
    assert_parses("class A { get #a() {}; set #a(v) {} }");
    assert_parses("class A { set #a(v) {} get #a() { return 1 } }");
}

#[test]
fn test_fields_and_static_members() {
    assert_parses("class A { #a = 1; #b = this.#a; static #s = 2; static m() { return A.#s } }");
    assert_parses("class A { #a; static { this.#a } }");
}

#[test]
fn test_async_and_generator_methods() {
    assert_parses("class A { async #a() {} *#b() {} async *#c() {} m() { this.#a(); this.#b(); this.#c() } }");
}

#[test]
fn test_optional_and_nested_member_access() {
    assert_parses("class A { #x = 1; m(o) { return o.#x + o?.#x + o.p.#x + o[0].#x } }");
}

#[test]
fn test_inner_class_sees_outer_names() {
    assert_parses("class A { #x; m() { return class { n() { return this.#x } } } }");
}

#[test]
fn test_inner_reference_resolved_by_later_outer_declaration() {
    assert_parses("class A { m() { class B { n() { this.#y } } } #y() {} }");
}

#[test]
fn test_inner_declaration_shadows_outer() {
    assert_parses("class A { #x; m() { class B { #x; n() { this.#x } } } }");
}

#[test]
fn test_same_name_in_sibling_classes() {
    assert_parses("class A { #x; } class B { #x; m() { this.#x } }");
}

#[test]
fn test_reserved_words_allowed_by_default() {
    assert_parses("class A { #class; #enum() {} m() { this.#class; this.#enum() } }");
}

#[test]
fn test_super_member_access_in_private_method() {
    assert_parses("class A extends B { #m() { super.m(); super['n'] } }");
}

#[test]
fn test_direct_super_outside_private_method() {
    assert_parses("class A extends B { constructor() { super() } m() { super() } }");
    assert_parses("class A extends B { #m() { class C extends D { constructor() { super() } } } }");
}

#[test]
fn test_private_members_as_destructuring_targets() {
    assert_parses("class A { #x; m(a) { [this.#x] = a } }");
    assert_parses("class A { #x; m(o) { ({ k: this.#x } = o) } }");
    assert_parses("class A { #x; m(xs) { for ([this.#x] of xs); } }");
    assert_parses("class A { #x; #y; m(o) { ({ a: this.#x = 1, ...this.#y } = o) } }");
}

#[test]
fn test_delete_of_public_member() {
    assert_parses("class A { #a; m() { delete this.a; delete this[0] } }");
}

#[test]
fn test_ecma_2017_year_form() {
    let options = ParserOptions {
        ecma_version: 2017,
        ..Default::default()
    };
    assert!(parse_with("class A { #x; m() { this.#x } }", options).is_ok());
}

#[test]
fn test_plugin_reusable_after_error() {
    let mut parser = Parser::with_plugin(
        "class A { m() { this.#a; class B { n() { @ } } } }",
        ParserOptions::default(),
        PrivateNames::new(),
    );
    let err = parser.parse().unwrap_err();
    assert_eq!(err.message, "Unexpected character '@'");

    let plugin = parser.into_plugin();
    assert_eq!(plugin.depth(), 0);
    assert!(!plugin.in_private_method());

    let mut parser = Parser::with_plugin(
        "class A { #a; m() { this.#a } }",
        ParserOptions::default(),
        plugin,
    );
    assert!(parser.parse().is_ok());
}

#[test]
fn test_private_name_key_in_program() {
    let program = parse_with_private_names("class A { #x = 1 }").unwrap();
    assert_eq!(program.body.len(), 1);
}
