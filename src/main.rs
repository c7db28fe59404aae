use std::fs;
use std::io::Read;
use std::io::Write;
use std::io::{self};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use colored::*;
use log::debug;
use tee_secure::reverse;

#[derive(Parser, Debug)]
#[clap(name = "tee-secure", about = "Inverte os bytes de um texto, arquivo ou stdin")]
struct Args
{
    /// Texto a inverter (tem prioridade sobre --file e stdin)
    text: Option<String>,

    /// Arquivo cujos bytes serão invertidos
    #[clap(short, long, env = "TEE_SECURE_INPUT_FILE")]
    file: Option<PathBuf>,

    /// Não adicionar quebra de linha após um TEXT invertido
    #[clap(long)]
    no_newline: bool,
}

#[derive(Debug, PartialEq)]
enum Source
{
    Text,
    File,
    Stdin,
}

fn read_input<R: Read>(args: &Args, mut stdin: R) -> Result<(Vec<u8>, Source)>
{
    if let Some(text) = &args.text
    {
        return Ok((text.clone().into_bytes(), Source::Text));
    }

    if let Some(path) = &args.file
    {
        let bytes = fs::read(path).with_context(|| format!("Erro ao ler {}", path.display()))?;
        return Ok((bytes, Source::File));
    }

    let mut bytes = Vec::new();
    stdin.read_to_end(&mut bytes).context("Erro ao ler stdin")?;
    Ok((bytes, Source::Stdin))
}

fn run<R: Read, W: Write>(args: &Args, stdin: R, mut out: W) -> Result<()>
{
    let (input, source) = read_input(args, stdin)?;
    debug!("{} bytes lidos de {:?}", input.len(), source);

    let reversed = reverse(&input)?;

    out.write_all(&reversed).context("Erro ao escrever em stdout")?;

    // Saída de arquivo/stdin fica crua para poder voltar por um pipe
    if source == Source::Text && !args.no_newline
    {
        out.write_all(b"\n")?;
    }
    out.flush()?;

    Ok(())
}

fn main() -> ExitCode
{
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match run(&args, io::stdin().lock(), io::stdout().lock())
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) =>
        {
            eprintln!("{} {:#}", "Erro:".red().bold(), e);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests
{
    use std::path::Path;

    use super::*;

    fn args(text: Option<&str>, file: Option<&Path>, no_newline: bool) -> Args
    {
        Args {
            text: text.map(str::to_string),
            file: file.map(Path::to_path_buf),
            no_newline,
        }
    }

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf
    {
        let path = std::env::temp_dir().join(format!("tee-secure-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    fn run_to_vec(args: &Args, stdin: &[u8]) -> Result<Vec<u8>>
    {
        let mut out = Vec::new();
        run(args, stdin, &mut out)?;
        Ok(out)
    }

    #[test]
    fn text_wins_over_file_and_stdin()
    {
        let path = temp_file("precedence", b"arquivo");
        let (bytes, source) = read_input(&args(Some("texto"), Some(&path), false), &b"stdin"[..]).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(bytes, b"texto");
        assert_eq!(source, Source::Text);
    }

    #[test]
    fn file_wins_over_stdin()
    {
        let path = temp_file("file-over-stdin", b"arquivo");
        let (bytes, source) = read_input(&args(None, Some(&path), false), &b"stdin"[..]).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(bytes, b"arquivo");
        assert_eq!(source, Source::File);
    }

    #[test]
    fn text_gets_a_newline()
    {
        assert_eq!(run_to_vec(&args(Some("hello"), None, false), b"").unwrap(), b"olleh\n");
    }

    #[test]
    fn no_newline_flag_keeps_text_raw()
    {
        assert_eq!(run_to_vec(&args(Some("hello"), None, true), b"").unwrap(), b"olleh");
    }

    #[test]
    fn file_output_is_raw()
    {
        let path = temp_file("raw", &[0x01, 0x00, 0x02]);
        let out = run_to_vec(&args(None, Some(&path), false), b"");
        fs::remove_file(&path).ok();

        assert_eq!(out.unwrap(), vec![0x02, 0x00, 0x01]);
    }

    #[test]
    fn stdin_round_trips_through_two_runs()
    {
        let once = run_to_vec(&args(None, None, false), b"abc\n").unwrap();
        assert_eq!(once, b"\ncba");

        let twice = run_to_vec(&args(None, None, false), &once).unwrap();
        assert_eq!(twice, b"abc\n");
    }

    #[test]
    fn unreadable_file_reports_context()
    {
        let path = std::env::temp_dir().join("tee-secure-nao-existe/entrada.bin");
        let err = run_to_vec(&args(None, Some(&path), false), b"").unwrap_err();

        assert!(format!("{:#}", err).contains("Erro ao ler"));
    }
}
