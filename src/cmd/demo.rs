/*!
`demo.rs`

The command tree served by the `cli-mcp` binary.

Layout (tool names in brackets):
  demo [--verbose]            persistent flag, inherited by every command
    add      [add]            a + b
    math
      mul    [math_mul]       x * y
    echo     [echo]           required message, read-only / idempotent
    sleep    [sleep]          waits, stops early on cancellation
    report   [report]         builds its own call result
    fail     [fail]           writes to stderr and errors
    internal                  hidden, never exposed as a tool
*/

use std::sync::Arc;
use std::time::{Duration, Instant};

use rmcp::model::Content;

use cli_mcp::command::{CommandBuilder, CommandNode, Flag, format_duration};
use cli_mcp::{ToolOptions, ToolSet, generate_tools};

const SLEEP_TICK: Duration = Duration::from_millis(10);

/// Build a brand-new demo tree.
pub fn build() -> CommandNode {
    CommandNode::new("demo")
        .about("Demo command tree exposed as MCP tools")
        .persistent_flag(Flag::bool("verbose", false, "Print extra detail"))
        .subcommand(add())
        .subcommand(CommandNode::new("math").about("Math operations").subcommand(mul()))
        .subcommand(echo())
        .subcommand(sleep())
        .subcommand(report())
        .subcommand(fail())
        .subcommand(
            CommandNode::new("internal")
                .about("Internal maintenance command")
                .hide()
                .run(|inv| {
                    inv.println("internal");
                    Ok(())
                }),
        )
}

pub fn builder() -> CommandBuilder {
    Arc::new(build)
}

/// Tools generated from the demo tree with default options.
pub fn tool_set() -> ToolSet {
    generate_tools(builder(), &ToolOptions::default())
}

fn add() -> CommandNode {
    CommandNode::new("add")
        .about("Add two integers")
        .long_about("Add two integers and print `Result: <sum>`.")
        .flag(Flag::int("a", 0, "First operand"))
        .flag(Flag::int("b", 0, "Second operand"))
        .read_only_hint(true)
        .run(|inv| {
            let (a, b) = (inv.get_int("a")?, inv.get_int("b")?);
            let sum = a
                .checked_add(b)
                .ok_or_else(|| anyhow::anyhow!("{a} + {b} overflows"))?;
            if inv.get_bool("verbose")? {
                inv.println(format!("{a} + {b} = {sum}"));
            }
            inv.print(format!("Result: {sum}"));
            Ok(())
        })
}

fn mul() -> CommandNode {
    CommandNode::new("mul")
        .about("Multiply two numbers")
        .flag(Flag::float("x", 0.0, "First factor"))
        .flag(Flag::float("y", 0.0, "Second factor"))
        .read_only_hint(true)
        .run(|inv| {
            let product = inv.get_float("x")? * inv.get_float("y")?;
            inv.print(format!("Result: {product}"));
            Ok(())
        })
}

fn echo() -> CommandNode {
    CommandNode::new("echo")
        .about("Echo a message")
        .tool_title("Echo")
        .flag(Flag::string("message", "", "Message to echo"))
        .flag(Flag::bool("upper", false, "Uppercase the message"))
        .flag(Flag::int("repeat", 1, "Number of repetitions"))
        .read_only_hint(true)
        .idempotent_hint(true)
        .run(|inv| {
            let mut message = inv.get_string("message")?;
            if inv.get_bool("upper")? {
                message = message.to_uppercase();
            }
            let repeat = inv.get_int("repeat")?;
            if repeat < 1 {
                anyhow::bail!("repeat must be at least 1, got {repeat}");
            }
            let lines = vec![message; repeat as usize];
            inv.print(lines.join("\n"));
            Ok(())
        })
}

fn sleep() -> CommandNode {
    CommandNode::new("sleep")
        .about("Sleep for a duration")
        .flag(Flag::duration("for", Duration::from_millis(100), "How long to sleep"))
        .idempotent_hint(true)
        .run(|inv| {
            let total = inv.get_duration("for")?;
            let started = Instant::now();
            while started.elapsed() < total {
                if inv.is_cancelled() {
                    anyhow::bail!(
                        "cancelled after {}",
                        format_duration(started.elapsed())
                    );
                }
                std::thread::sleep(SLEEP_TICK.min(total.saturating_sub(started.elapsed())));
            }
            inv.print(format!("slept {}", format_duration(total)));
            Ok(())
        })
}

fn report() -> CommandNode {
    CommandNode::new("report")
        .about("Produce a report as structured content")
        .flag(Flag::string("section", "summary", "Report section"))
        .flag(Flag::string_slice("items", &[], "Items to include"))
        .run(|inv| {
            let section = inv.get_string("section")?;
            let items = inv.get_string_slice("items")?;
            inv.print("not part of the result");
            let result = inv.result();
            result
                .content
                .push(Content::text(format!("report: {section}")));
            for item in items {
                result.content.push(Content::text(format!("- {item}")));
            }
            Ok(())
        })
}

fn fail() -> CommandNode {
    CommandNode::new("fail")
        .about("Always fails")
        .flag(Flag::string("reason", "demo failure", "Failure message"))
        .destructive_hint(false)
        .run(|inv| {
            let reason = inv.get_string("reason")?;
            inv.eprintln("about to fail");
            anyhow::bail!(reason)
        })
}
