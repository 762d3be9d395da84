//! Server-side rendering of the HTML pages.
//!
//! Templates live in `templates/` and are embedded into the binary, then
//! loaded lazily by name the first time a page asks for them.

use std::sync::LazyLock;

use minijinja::{Environment, Error, ErrorKind};
use rust_embed::RustEmbed;
use serde::Serialize;

#[derive(RustEmbed)]
#[folder = "templates"]
struct Templates;

const PLAINTEXT_WIDTH: usize = 200;

/// Target-network notes arrive as HTML fragments; render them as text.
fn plaintext(value: &str) -> String {
    html2text::from_read(value.as_bytes(), PLAINTEXT_WIDTH)
        .map_or_else(|_| value.to_string(), |text| text.trim().to_string())
}

fn load_template(name: &str) -> Result<Option<String>, Error> {
    let Some(file) = Templates::get(name) else {
        return Ok(None);
    };
    String::from_utf8(file.data.into_owned())
        .map(Some)
        .map_err(|e| {
            Error::new(ErrorKind::InvalidOperation, "template is not valid UTF-8").with_source(e)
        })
}

static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    // `.html` names get HTML auto-escaping from the default callback.
    env.set_loader(load_template);
    env.add_filter("plaintext", plaintext);
    env
});

pub fn render_template<T: Serialize>(name: &str, ctx: T) -> Result<String, Error> {
    let tpl = ENV.get_template(name)?;
    tpl.render(ctx)
}
