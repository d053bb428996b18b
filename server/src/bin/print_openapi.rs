use clap::Parser;
use eyre::{Context, Result};
use utoipa::OpenApi;

use folio::openapi;

#[derive(Parser)]
#[command(about = "Print the OpenAPI document of the folio API")]
struct Cli {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,
}

fn to_camel_case(s: &str) -> String {
    let mut cs = String::with_capacity(s.len());
    let mut it = s.chars().peekable();
    while let Some(c) = it.next() {
        match (c, it.peek()) {
            ('_', Some(nc)) if *nc != '_' => {
                cs.push(nc.to_ascii_uppercase());
                let _ = it.next(); // consume nc
            }
            (c, _) => {
                cs.push(c);
            }
        }
    }
    cs
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let mut oapi: utoipa::openapi::OpenApi = openapi::ApiDoc::openapi();
    // operationIds are handler names, the frontend client wants camelCase
    oapi.paths.paths.iter_mut().for_each(|(_path, path_item)| {
        path_item.operations.iter_mut().for_each(|(_, op)| {
            op.operation_id = op.operation_id.as_ref().map(|name| to_camel_case(name));
        });
    });
    let json = oapi
        .to_pretty_json()
        .wrap_err("error serializing OpenAPI document")?;
    match args.output {
        Some(path) => std::fs::write(&path, json).wrap_err_with(|| format!("error writing {}", path))?,
        None => println!("{}", json),
    }
    Ok(())
}
