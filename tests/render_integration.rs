//! Integration tests for executing documents against a handler registry

use std::sync::{Arc, Mutex};

use braai::{
    parse, render, render_with_config, EngineConfig, ExecError, HandlerMux, MethodTable,
    RenderError,
};
use pretty_assertions::assert_eq;

struct Product {
    name: &'static str,
}

fn product_mux() -> HandlerMux {
    let mut mux = HandlerMux::new();
    mux.bind(
        "product",
        MethodTable::new(Product { name: "Canon Foo" })
            .method_with_arg("Name", |p, model| Ok(format!("{} {}", p.name, model)))
            .method("Adjective", |_| Ok("greatest".to_string())),
    );
    mux
}

#[test]
fn test_text_passes_through() {
    let mux = HandlerMux::new();
    assert_eq!(
        render("exectest", "No tags at all, just *text*", &mux).unwrap(),
        "No tags at all, just *text*"
    );
}

#[test]
fn test_plain_handlers() {
    let mut mux = HandlerMux::new();
    mux.register_tag("greeting", |_| Ok("Hello".to_string()));
    assert_eq!(render("exectest", "The {{greeting}}!", &mux).unwrap(), "The Hello!");
}

#[test]
fn test_method_dispatch() {
    let out = render(
        "exectest",
        "The {{product.name['9000']}} is the {{product.adjective}} camera",
        &product_mux(),
    )
    .unwrap();
    assert_eq!(out, "The Canon Foo 9000 is the greatest camera");
}

#[test]
fn test_undefined_method() {
    let err = render(
        "exectest",
        "The {{product.name['9000']}} is the {{product.verb}} camera",
        &product_mux(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        RenderError::Exec(ExecError::UndefinedMethod {
            method: "Verb".to_string(),
            tag: "product".to_string(),
        })
    );
}

#[test]
fn test_missing_handler() {
    let err = render("exectest", "A greeting: {{mystery}}", &HandlerMux::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "exec error: exectest:1:15: Exec error - Handler not defined for tag: mystery"
    );
}

#[test]
fn test_block_handlers() {
    let mut mux = HandlerMux::new();
    mux.register_block_tag("callout", |block, mux| {
        Ok(format!("<c>{}</c>", block.body.execute(mux)?))
    });
    assert_eq!(
        render("exectest", "{{callout}}X{{/callout}}", &mux).unwrap(),
        "<c>X</c>"
    );
    assert_eq!(mux.block_handlers(), vec!["callout"]);
}

#[test]
fn test_default_handler_sees_every_unknown_tag() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let mut mux = HandlerMux::new();
    mux.register_tag("known", |_| Ok("K".to_string()))
        .register_default(move |tag| {
            recorder.lock().unwrap().push(tag.name.clone());
            Ok(format!("{{{{ {}}}}}", tag.name))
        });

    let doc = parse("default", "Tag 1: {{foo}}, Tag 2: {{bar}} {{known}}", &[]).unwrap();
    let out = doc.execute(&mux).unwrap();
    assert_eq!(out, "Tag 1: {{ foo}}, Tag 2: {{ bar}} K");
    assert_eq!(*seen.lock().unwrap(), vec!["foo", "bar"]);
}

#[test]
fn test_parse_error_surfaces_through_render() {
    let err = render("exectest", "Text {{", &HandlerMux::new()).unwrap_err();
    match err {
        RenderError::Parse(e) => assert_eq!(e.message(), "Unexpected end of action"),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_render_with_config_block_tags() {
    let mut mux = HandlerMux::new();
    mux.register_block_tag("aside", |block, mux| {
        Ok(format!("({})", block.body.execute(mux)?))
    })
    .register_block_tag("callout", |block, mux| {
        Ok(format!("<c>{}</c>", block.body.execute(mux)?))
    });
    let config = EngineConfig::new().with_block_tag("aside");
    assert_eq!(
        render_with_config("{{aside}}a{{callout}}b{{/callout}}{{/aside}}", &config, &mux).unwrap(),
        "(a<c>b</c>)"
    );
}

#[test]
fn test_registry_is_shared_between_threads() {
    let mut mux = product_mux();
    mux.register_block_tag("callout", |block, mux| {
        Ok(format!("<c>{}</c>", block.body.execute(mux)?))
    });
    let mux = &mux;

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                scope.spawn(move || {
                    let input = format!("{{{{callout}}}}{{{{product.name({i})}}}}{{{{/callout}}}}");
                    render("thread", &input, mux)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    for (i, out) in outputs.iter().enumerate() {
        assert_eq!(out, &format!("<c>Canon Foo {i}</c>"));
    }
}
