use crate::{ui, Workspace};
use anyhow::Result;
use std::io::{self, BufRead, Write};

const MENU: &str = "\
  1) List entries
  2) Toggle an entry
  3) Apply
  4) Help
  q) Quit";

/// Numbered menu over list/toggle/apply until quit or end of input
pub fn execute(workspace: &Workspace, input: &mut dyn BufRead) -> Result<()> {
    let mut failed = false;

    loop {
        println!();
        println!("shelf");
        println!("{MENU}");
        let Some(choice) = prompt(input, "Select: ")? else {
            break;
        };

        let result = match choice.as_str() {
            "1" => super::list::execute(workspace),
            "2" => {
                let Some(answer) = prompt(input, "Index to toggle: ")? else {
                    break;
                };
                match answer.parse::<i64>() {
                    Ok(index) => super::toggle::execute(workspace, index, true),
                    Err(_) => {
                        ui::warn(format!("'{answer}' is not an index"));
                        continue;
                    }
                }
            }
            "3" => super::apply::execute(workspace),
            "4" => {
                print_help();
                Ok(())
            }
            "q" | "0" | "quit" | "exit" => break,
            "" => continue,
            other => {
                ui::warn(format!("Unknown option '{other}'"));
                continue;
            }
        };

        if let Err(err) = result {
            ui::error(format!("{err:#}"));
            failed = true;
        }
    }

    if failed {
        anyhow::bail!("One or more operations failed");
    }
    Ok(())
}

fn prompt(input: &mut dyn BufRead, message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn print_help() {
    println!();
    println!("Entries are addressed by the index shown in the list.");
    println!("Toggling flips enable/disable in the registry and applies right away.");
    println!("Apply resets every managed profile block and tool link, then rebuilds");
    println!("them from the enabled entries.");
    println!();
    println!("The same operations are available as commands:");
    println!("  shelf list | shelf toggle <INDEX> | shelf apply | shelf help");
}
