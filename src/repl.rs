use advisor_core::config::AppConfig;
use advisor_core::selection::SelectionChange;
use advisor_core::types::{Product, Sender};
use advisor_render::html::{CHOOSE_CATEGORY, MODAL_NO_DESCRIPTION, NO_MATCHES, NO_SELECTION};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::{Config as RlConfig, DefaultEditor};

use crate::widget::Widget;

const BANNER: &str = r#"
  ╔═══════════════════════════════════════════╗
  ║          routine-advisor v0.1.0           ║
  ║   Personalized beauty routine advisor     ║
  ╚═══════════════════════════════════════════╝

  Type a question and press Enter to ask the advisor.
  Commands:
    /categories       List catalog categories
    /category [name]  Filter by category (empty shows all)
    /search [term]    Filter by keyword (empty clears)
    /toggle <id>      Select or deselect a product
    /remove <id>      Remove a product from the selection
    /details <id>     Show product details
    /close            Close the details panel
    /selected         List selected products
    /routine          Generate a routine for the selection
    /config           Show current config
    /help             Show this help
    /exit             Quit
"#;

/// Run the interactive advisor.
pub async fn run(config: AppConfig) -> Result<()> {
    println!("{}", BANNER);
    println!(
        "  Catalog: {}  |  Endpoint: {}",
        config.catalog.source, config.assistant.endpoint
    );
    if let Some(page) = &config.ui.page_path {
        println!("  Page: {}", page.display());
    }
    println!();

    let mut widget = Widget::from_config(&config)?;
    if let Err(e) = widget.start().await {
        eprintln!("\x1b[0;31mError loading products: {}\x1b[0m", e);
    }
    if widget.filter().applied {
        println!("  Restored category: {}", widget.filter().category);
        print_products(&widget);
    }
    if !widget.selection().is_empty() {
        println!("  {} product(s) selected.", widget.selection().len());
    }

    let rl_config = RlConfig::builder().auto_add_history(true).build();
    let history_path = AppConfig::data_dir().join("repl_history.txt");
    let mut rl = DefaultEditor::with_config(rl_config)?;
    let _ = rl.load_history(&history_path);

    loop {
        let prompt = format!(
            "\x1b[1;36m{}\x1b[0m \x1b[1;32m❯\x1b[0m ",
            widget.selection().len()
        );

        // Read on a blocking thread so a pending follow-up can land while the
        // prompt is waiting.
        let readline = tokio::task::spawn_blocking(move || {
            let line = rl.readline(&prompt);
            (rl, line)
        });
        let (editor, line) = widget
            .wait_with_follow_up(readline, |widget| {
                println!();
                print_last_reply(widget);
            })
            .await?;
        rl = editor;

        match line {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                if input.starts_with('/') {
                    let handled = handle_command(input, &mut widget, &config).await?;
                    if !handled {
                        break;
                    }
                    continue;
                }

                widget.submit_chat(input).await;
                print_last_reply(&widget);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// Handle a slash command. Returns `true` to continue the loop, `false` to exit.
async fn handle_command(input: &str, widget: &mut Widget, config: &AppConfig) -> Result<bool> {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/exit" | "/quit" | "/q" => {
            println!("Goodbye!");
            return Ok(false);
        }
        "/categories" => {
            // Categories are only known once the catalog has been fetched.
            if let Err(e) = widget.load_catalog().await {
                print_error("Error loading products", &e);
            }
            for category in widget.categories() {
                println!("  • {}", category);
            }
        }
        "/category" => match widget.set_category(arg).await {
            Ok(()) => print_products(widget),
            Err(e) => print_error("Error loading products", &e),
        },
        "/search" => match widget.set_search(arg).await {
            Ok(()) => print_products(widget),
            Err(e) => print_error("Error loading products", &e),
        },
        "/toggle" => {
            if arg.is_empty() {
                println!("Usage: /toggle <product-id>");
            } else {
                match widget.toggle(arg).await {
                    Ok(SelectionChange::Added) => println!("  Selected {}", arg),
                    Ok(SelectionChange::Removed) => println!("  Deselected {}", arg),
                    Ok(SelectionChange::Unchanged) => println!("  No product with id {}", arg),
                    Err(e) => print_error("Error loading products", &e),
                }
            }
        }
        "/remove" => {
            if arg.is_empty() {
                println!("Usage: /remove <product-id>");
            } else if widget.remove(arg).is_mutation() {
                println!("  Removed {}", arg);
            } else {
                println!("  {} is not selected", arg);
            }
        }
        "/details" => {
            if arg.is_empty() {
                println!("Usage: /details <product-id>");
            } else {
                match widget.open_details(arg).await {
                    Ok(true) => print_details(widget, arg),
                    Ok(false) => println!("  No product with id {}", arg),
                    Err(e) => print_error("Error loading products", &e),
                }
            }
        }
        "/close" => {
            widget.close_details();
        }
        "/selected" => {
            let selected = widget.selection().products();
            if selected.is_empty() {
                println!("  {}", NO_SELECTION);
            } else {
                for product in selected {
                    println!("  {} {} ({})", product.id, product.name, product.brand);
                }
            }
        }
        "/routine" => {
            // A successful routine schedules its follow-up; the prompt loop
            // delivers it.
            widget.generate_routine().await;
            print_last_reply(widget);
        }
        "/config" => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        "/help" | "/?" => {
            println!("{}", BANNER.trim_start_matches('\n'));
        }
        _ => {
            println!(
                "Unknown command: {}. Type /help for available commands.",
                cmd
            );
        }
    }

    Ok(true)
}

fn print_products(widget: &Widget) {
    let Some(products) = widget.visible_products() else {
        println!("  {}", CHOOSE_CATEGORY);
        return;
    };
    if products.is_empty() {
        println!("  {}", NO_MATCHES);
        return;
    }
    for product in &products {
        print_product_line(widget, product);
    }
}

fn print_product_line(widget: &Widget, product: &Product) {
    let marker = if widget.selection().contains(product) {
        "\x1b[0;32m✓\x1b[0m"
    } else {
        " "
    };
    println!(
        "  {} {:>4}  {} \x1b[2m({})\x1b[0m",
        marker, product.id, product.name, product.brand
    );
}

fn print_details(widget: &Widget, id: &str) {
    let Some(product) = widget.product(id) else {
        return;
    };
    println!("  \x1b[1m{}\x1b[0m", product.name);
    println!("  Brand: {}", product.brand);
    println!("  Category: {}", product.category);
    println!(
        "  Description: {}",
        product
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(MODAL_NO_DESCRIPTION)
    );
}

fn print_last_reply(widget: &Widget) {
    if let Some(entry) = widget.transcript().last() {
        if entry.sender == Sender::Bot {
            let sent = entry.timestamp.with_timezone(&chrono::Local);
            println!(
                "\x1b[2m{}\x1b[0m \x1b[1;33madvisor\x1b[0m: {}",
                sent.format("%H:%M"),
                entry.text
            );
        }
    }
}

fn print_error(context: &str, e: &dyn std::fmt::Display) {
    eprintln!("\x1b[0;31m{}: {}\x1b[0m", context, e);
}
