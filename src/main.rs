use zim_reader::{UrlNamespace, ZimError, ZimReader};
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-zim-file> [<namespace>/<url>]", args[0]);
        std::process::exit(1);
    }

    let zim_path = &args[1];
    // Parse optional "A/Some_Article" lookup argument
    let lookup = match args.get(2) {
        Some(arg) => match arg.split_once('/') {
            Some((ns, url)) if ns.len() == 1 => Some((UrlNamespace::from(ns.as_bytes()[0]), url)),
            _ => {
                eprintln!("ERROR: Invalid lookup format. Expected <NAMESPACE_CHAR>/<URL>, e.g. A/Main_Page");
                std::process::exit(1);
            }
        },
        None => None,
    };

    println!("Reading ZIM file: {}", zim_path);
    println!("{}", "=".repeat(60));

    let reader = match ZimReader::new(zim_path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("\nERROR: Failed to read ZIM file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("\nArchive Information:");
    println!("  {}", reader);
    println!("  Version: {}.{}", reader.header.major_version, reader.header.minor_version);
    println!("  UUID: {}", reader.header.uuid_hex());
    println!("  Articles: {}", reader.article_count());
    println!("  Clusters: {}", reader.cluster_count());
    println!("  MIME types: {}", reader.mime_types().join(", "));

    match reader.main_page() {
        Ok(Some(entry)) => println!("  Main page: {}/{}", entry.namespace, entry.url),
        Ok(None) => println!("  Main page: (none)"),
        Err(e) => println!("  Main page: unreadable ({})", e),
    }

    if let Some((namespace, url)) = lookup {
        println!("\n{}", "=".repeat(60));
        match reader.get_article_by_url(namespace, url) {
            Ok(article) => {
                println!("Title: {}", article.entry.title());
                if let Some(mime) = reader.mime_type_of(&article.entry) {
                    println!("MIME: {}", mime);
                }
                println!("Size: {} bytes", article.body.len());
                println!("{}", "-".repeat(60));
                println!("{}", article.body_text());
            }
            Err(ZimError::NotFound { namespace, url }) => {
                eprintln!("Not found: {}/{}", namespace, url);
                std::process::exit(2);
            }
            Err(e) => {
                eprintln!("\nERROR: Failed to read article");
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("\nSample Articles (first 10):");
        for (i, url) in reader.article_urls().take(10).enumerate() {
            match url {
                Ok(url) => println!("  {}. {}", i + 1, url),
                Err(e) => println!("  {}. <error: {}>", i + 1, e),
            }
        }
    }
}
