//! Draws lines described by a JSON batch and saves the result as PNG
#![deny(warnings)]

use linegen::*;
use std::{
    env,
    fs::File,
    io::{BufReader, BufWriter, Read},
};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    input_image: Option<String>,
    batch_file: String,
    output_file: String,
    plan: bool,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args {
            input_image: None,
            batch_file: String::new(),
            output_file: String::new(),
            plan: false,
        };
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "lines".to_string());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-i" => {
                    let input = args.next().ok_or("-i requires argument")?;
                    result.input_image = Some(input);
                }
                "-p" => {
                    result.plan = true;
                }
                _ => {
                    positional += 1;
                    match positional {
                        1 => result.batch_file = arg,
                        2 => result.output_file = arg,
                        _ => return Err("unexpected positional argument".into()),
                    }
                }
            }
        }
        if positional < 2 {
            eprintln!("Draws lines described by a JSON batch and saves the result as PNG");
            eprintln!("\nUSAGE:");
            eprintln!("    {} [-i <input.png>] [-p] <batch.json> <out.png>", cmd);
            eprintln!("\nARGS:");
            eprintln!("    -i <input.png>     draw on top of the image instead of a blank canvas");
            eprintln!("    -p                 print commands executed in each round");
            eprintln!("    <batch.json>       file containing batch description ('-' means stdin)");
            eprintln!("    <out.png>          image rendered in the PNG format ('-' means stdout)");
            std::process::exit(1);
        }
        Ok(result)
    }
}

/// Load batch description from the file
fn batch_load(path: &str) -> Result<BatchSpec, Error> {
    let batch = if path != "-" {
        BatchSpec::from_reader(BufReader::new(File::open(path)?))?
    } else {
        let mut contents = String::new();
        std::io::stdin().read_to_string(&mut contents)?;
        BatchSpec::from_json(&contents)?
    };
    Ok(batch)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    let batch = tracing::debug_span!("[parse]").in_scope(|| batch_load(&args.batch_file))?;

    let mut image = match &args.input_image {
        Some(input) => tracing::debug_span!("[load]")
            .in_scope(|| read_png(BufReader::new(File::open(input)?)).map_err(Error::from))?,
        None => batch.canvas(),
    };
    tracing::debug!(
        "[image] {}x{} commands={}",
        image.width(),
        image.height(),
        batch.commands.len()
    );

    let generator = batch.generator()?;
    if args.plan {
        for (round, indices) in generator.plan().iter().enumerate() {
            eprintln!("round {}: {:?}", round, indices);
        }
    }
    let result = generator.apply_commands(&mut image);

    // save whatever was drawn even if some commands failed
    let save = tracing::debug_span!("[save]");
    {
        let _guard = save.enter();
        if args.output_file != "-" {
            write_png(&image, BufWriter::new(File::create(&args.output_file)?))?;
        } else {
            write_png(&image, std::io::stdout())?;
        }
    }

    let cycles = result?;
    eprintln!("{} command(s) drawn in {} round(s)", generator.len(), cycles);
    Ok(())
}
