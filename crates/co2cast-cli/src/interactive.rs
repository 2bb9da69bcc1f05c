//! Prompt-driven form: one field at a time, then a rendered result.

use std::io::{BufRead, Write};

use anyhow::Result;
use co2cast_core::{present, FeatureSchema, GatewayStatus, SubmissionCycle, VariantProfile};

use crate::parse_assignment;

pub struct Session<'a> {
    profile: &'static VariantProfile,
    status: &'a GatewayStatus,
    schema: FeatureSchema,
    cycle: SubmissionCycle,
}

impl<'a> Session<'a> {
    pub fn new(profile: &'static VariantProfile, schema: FeatureSchema, status: &'a GatewayStatus) -> Result<Self> {
        let mut cycle = SubmissionCycle::new(schema.clone());
        cycle.begin()?;
        Ok(Self {
            profile,
            status,
            schema,
            cycle,
        })
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        display_welcome(out, self.profile, self.status)?;

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                break; // EOF
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
                Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
                None => (trimmed.to_lowercase(), ""),
            };

            match cmd.as_str() {
                "help" | "h" | "?" => display_help(out)?,
                "fields" | "f" => self.show_fields(out)?,
                "set" => {
                    if let Err(e) = self.set(rest) {
                        writeln!(out, "Error: {}", e)?;
                    }
                }
                "predict" | "p" => {
                    if !self.walk_fields(input, out)? {
                        break;
                    }
                    self.submit(out)?;
                }
                "submit" | "s" => self.submit(out)?,
                "reset" => {
                    self.cycle.collector_mut()?.reset();
                    writeln!(out, "  All fields back to defaults.")?;
                }
                "exit" | "quit" | "q" => {
                    writeln!(out, "  Goodbye!")?;
                    break;
                }
                _ => writeln!(out, "Unknown command: {}. Type 'help' for available commands.", cmd)?,
            }
        }

        Ok(())
    }

    fn set(&mut self, args: &str) -> Result<()> {
        if args.is_empty() {
            anyhow::bail!("Usage: set <key>=<value> [<key>=<value> ...]");
        }
        for arg in args.split_whitespace() {
            let (key, value) = parse_assignment(arg).map_err(anyhow::Error::msg)?;
            self.cycle.collector_mut()?.set(&key, value)?;
        }
        Ok(())
    }

    /// Prompts for every field. Blank input keeps the shown value.
    /// Returns `false` if input ended midway.
    fn walk_fields<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<bool> {
        writeln!(out)?;
        writeln!(out, "{}", self.profile.inputs_heading)?;
        for field in self.cycle.collector().fields() {
            writeln!(out, "  {}", field.help)?;
            write!(out, "  {} [{}]: ", field.label, field.value)?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                return Ok(false);
            };
            let entered = line.trim();
            if !entered.is_empty() {
                self.cycle.collector_mut()?.set(field.key, entered)?;
            }
        }
        Ok(true)
    }

    fn submit<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let view = {
            let outcome = self.cycle.submit(self.status)?;
            present(outcome, self.profile, &self.schema)
        };
        self.cycle.finish()?;
        self.cycle.begin()?;

        writeln!(out)?;
        write!(out, "{}", view.render_text())?;
        writeln!(out)?;
        Ok(())
    }

    fn show_fields<W: Write>(&self, out: &mut W) -> Result<()> {
        let fields = self.cycle.collector().fields();
        let width = fields.iter().map(|f| f.key.len()).max().unwrap_or(0);

        writeln!(out)?;
        writeln!(out, "{}", self.profile.inputs_heading)?;
        writeln!(out, "{:-<70}", "")?;
        for field in &fields {
            writeln!(out, "  {:<w$}  {:<14} {}", field.key, field.value, field.range_hint, w = width)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn display_welcome<W: Write>(out: &mut W, profile: &VariantProfile, status: &GatewayStatus) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", profile.title)?;
    writeln!(out, "  {}", profile.subtitle)?;
    writeln!(out)?;
    if let Some(e) = status.load_error() {
        writeln!(out, "  Failed to load model: {}", e)?;
        writeln!(out)?;
    }
    writeln!(out, "  predict, p             # Fill in every field, then predict")?;
    writeln!(out, "  set <key>=<value>      # Change one field")?;
    writeln!(out, "  submit, s              # Predict with the current fields")?;
    writeln!(out, "  help                   # Show all command options")?;
    writeln!(out)?;
    Ok(())
}

fn display_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Available Commands:")?;
    writeln!(out, "  predict, p             Prompt for each field (Enter keeps the shown value), then predict")?;
    writeln!(out, "  set <key>=<value> ...  Change one or more fields")?;
    writeln!(out, "  fields, f              Show current field values and safe ranges")?;
    writeln!(out, "  submit, s              Predict with the current field values")?;
    writeln!(out, "  reset                  Restore every field to its default")?;
    writeln!(out, "  help, h                Show this help message")?;
    writeln!(out, "  exit, quit, q          Leave the session")?;
    writeln!(out)?;
    Ok(())
}
