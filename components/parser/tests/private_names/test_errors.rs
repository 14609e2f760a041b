use super::{error_of, parse_with};
use core_types::ErrorKind;
use parser::{parse_with_private_names, AllowReserved, ParserOptions, SourceType};

#[test]
fn test_undeclared_private_name() {
    assert_eq!(
        error_of("class A { a() { this.#a } }"),
        "Usage of undeclared private name (1:21)"
    );
    let err = parse_with_private_names("class A { a() { this.#a } }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::EarlyError);
}

#[test]
fn test_earliest_undeclared_name_reported() {
    assert_eq!(
        error_of("class A { a() { this.#a } b() { this.#b } }"),
        "Usage of undeclared private name (1:21)"
    );
    assert_eq!(
        error_of("class A { a() { this.#b; this.#a; this.#b } }"),
        "Usage of undeclared private name (1:21)"
    );
}

#[test]
fn test_undeclared_in_nested_class_reported_by_outermost() {
    assert_eq!(
        error_of("class A { m() { class B { n() { this.#z } } } }"),
        "Usage of undeclared private name (1:37)"
    );
}

#[test]
fn test_duplicate_private_element() {
    assert_eq!(
        error_of("class A { #a() {}; #a() {} }"),
        "Duplicate private element (1:19)"
    );
    assert_eq!(
        error_of("class A { #a; #a() {} }"),
        "Duplicate private element (1:14)"
    );
    assert_eq!(
        error_of("class A { get #a() {} get #a() {} }"),
        "Duplicate private element (1:22)"
    );
    assert_eq!(
        error_of("class A { get #a() {} set #a(v) {} #a; }"),
        "Duplicate private element (1:35)"
    );
}

#[test]
fn test_delete_private_member() {
    assert_eq!(
        error_of("class A { #a() {}; f() { delete this.#a } }"),
        "Private elements may not be deleted (1:25)"
    );
    let err = parse_with_private_names("class A { #a() {}; f() { delete this.#a } }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::EarlyError);
}

#[test]
fn test_private_constructor() {
    assert_eq!(
        error_of("class A { #constructor() {} }"),
        "Classes may not have a private method named constructor (1:10)"
    );
    assert_eq!(
        error_of("class A { static #constructor = 1 }"),
        "Classes may not have a private method named constructor (1:10)"
    );
}

#[test]
fn test_direct_super_in_private_method() {
    assert_eq!(
        error_of("class A extends B { #m() { super() } }"),
        "A class method that is not a constructor may not contain a direct super (1:27)"
    );
    assert_eq!(
        error_of("class A extends B { #m() { () => super() } }"),
        "A class method that is not a constructor may not contain a direct super (1:33)"
    );
}

#[test]
fn test_private_method_context_restored_after_nested_method() {
    assert_eq!(
        error_of("class A extends B { #m() { class C { n() {} }; super() } }"),
        "A class method that is not a constructor may not contain a direct super (1:47)"
    );
}

#[test]
fn test_malformed_private_names() {
    assert_eq!(error_of("class A { #[ab]() {} }"), "Unexpected token (1:11)");
    assert_eq!(error_of("class A{ # a() {}}"), "Unexpected token (1:11)");
}

#[test]
fn test_private_name_in_object_literal() {
    assert_eq!(error_of("a = { #ab() {} }"), "Unexpected token (1:6)");
    assert_eq!(
        error_of("class A { [{#ab() {}}]() {} }"),
        "Unexpected token (1:12)"
    );
}

#[test]
fn test_private_name_outside_class() {
    assert_eq!(error_of("this.#x"), "Unexpected token (1:5)");
    assert_eq!(error_of("class A { #x } ; this.#x"), "Unexpected token (1:22)");
}

#[test]
fn test_escaped_async_is_not_a_modifier() {
    assert_eq!(
        error_of(r"class C { \u0061sync m(){} };"),
        "Unexpected token (1:21)"
    );
}

#[test]
fn test_old_ecma_version_rejects_private_names() {
    let options = ParserOptions {
        ecma_version: 7,
        ..Default::default()
    };
    let err = parse_with("class A { #x() {} }", options).unwrap_err();
    assert_eq!(err.to_string(), "Unexpected token (1:10)");
}

#[test]
fn test_allow_reserved_never() {
    let options = ParserOptions {
        allow_reserved: AllowReserved::Never,
        ..Default::default()
    };
    let err = parse_with("class A { #enum; }", options.clone()).unwrap_err();
    assert_eq!(err.to_string(), "The keyword 'enum' is reserved (1:10)");

    let err = parse_with("class A { #class() {} }", options.clone()).unwrap_err();
    assert_eq!(err.to_string(), "Unexpected keyword 'class' (1:10)");

    let err = parse_with("class A { #x; m() { this.#yield } }", options).unwrap_err();
    assert_eq!(err.to_string(), "The keyword 'yield' is reserved (1:25)");
}

#[test]
fn test_allow_reserved_never_reserves_await_in_modules() {
    let module = ParserOptions {
        allow_reserved: AllowReserved::Never,
        source_type: SourceType::Module,
        ..Default::default()
    };
    let err = parse_with("class A { #await; }", module).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot use keyword 'await' outside an async function (1:10)"
    );

    let script = ParserOptions {
        allow_reserved: AllowReserved::Never,
        ..Default::default()
    };
    assert!(parse_with("class A { #await; m() { this.#await } }", script).is_ok());
}

#[test]
fn test_member_targets_rejected_in_arrow_parameters() {
    assert_eq!(
        error_of("class A { #x; m() { ([this.#x]) => 0 } }"),
        "Assigning to rvalue (1:22)"
    );
    assert_eq!(
        error_of("class A { #x; m() { ([this.#x] = []) => 0 } }"),
        "Assigning to rvalue (1:22)"
    );
}
