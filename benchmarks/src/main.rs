use std::fs::File;
use std::fs::{self};
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use anyhow::Result;
use chrono::Local;
use clap::Parser;
use colored::*;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use rand::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use tee_secure::reverse;

#[derive(Parser, Debug)]
#[clap(name = "tee-secure benchmark", about = "Benchmark de inversão concorrente com tee-secure")]
struct Args
{
    /// Número de threads invertendo o mesmo payload (padrão: número de CPUs)
    #[clap(short, long)]
    threads: Option<usize>,

    /// Tamanho do payload em bytes
    #[clap(short, long, default_value = "1048576")]
    size: usize,

    /// Número máximo de inversões por thread
    #[clap(short, long, default_value = "1000")]
    iterations: usize,

    /// Duração máxima do teste em segundos
    #[clap(short, long, default_value = "15")]
    duration: u64,

    /// Pular fase de warmup
    #[clap(long)]
    no_warmup: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct CallResult
{
    duration_ms: f64,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LatencyStats
{
    min: f64,
    max: f64,
    mean: f64,
    median: f64,
    p90: f64,
    p99: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct BenchmarkResult
{
    threads: usize,
    payload_bytes: usize,
    calls: usize,
    successful: usize,
    panicked_workers: usize,
    total_time: f64,
    calls_per_sec: f64,
    throughput_mib_s: f64,
    latency_stats: Option<LatencyStats>,
}

// Diretório para salvar os resultados
const RESULTS_DIR: &str = "results";

const WARMUP_ROUNDS: usize = 20;

// Acima disso as latências são amostradas
const MAX_LATENCY_SAMPLES: usize = 10_000;

fn main() -> Result<()>
{
    dotenv::dotenv().ok();

    let args = Args::parse();
    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);

    println!(
        "{}\n{}: {}\n{}: {} bytes\n{}: {}\n{}: {} {}",
        "Benchmark - tee-secure reverse".green().bold(),
        "Threads".cyan(),
        threads,
        "Payload".cyan(),
        args.size,
        "Inversões máximas por thread".cyan(),
        args.iterations,
        "Duração máxima".cyan(),
        args.duration,
        "segundos".cyan(),
    );

    let payload = random_payload(args.size);

    if !args.no_warmup
    {
        warmup(&payload)?;
    }

    let result = run_benchmark(&payload, threads, &args);

    println!("\n{}\n", "Benchmark concluído!".green().bold());
    print_results(&result)?;

    Ok(())
}

fn random_payload(size: usize) -> Vec<u8>
{
    let mut payload = vec![0u8; size];
    rand::thread_rng().fill(&mut payload[..]);
    payload
}

fn warmup(payload: &[u8]) -> Result<()>
{
    println!("{}", "Realizando warmup...".blue().bold());

    for _ in 0..WARMUP_ROUNDS
    {
        let reversed = reverse(payload).context("Falha durante o warmup")?;
        std::hint::black_box(reversed);
    }

    println!("{}\n", "Warmup concluído.".blue().bold());
    Ok(())
}

fn is_mirrored(input: &[u8], output: &[u8]) -> bool
{
    output.len() == input.len() && output.first() == input.last() && output.last() == input.first()
}

fn worker(payload: &[u8], iterations: usize, deadline: Instant, pb: &ProgressBar) -> Vec<CallResult>
{
    let mut results = Vec::new();

    for _ in 0..iterations
    {
        if Instant::now() >= deadline
        {
            break;
        }

        let start = Instant::now();
        let outcome = reverse(payload);
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        let result = match outcome
        {
            Ok(output) => CallResult {
                duration_ms,
                success: is_mirrored(payload, &output),
                error: None,
            },
            Err(e) => CallResult {
                duration_ms,
                success: false,
                error: Some(e.to_string()),
            },
        };
        results.push(result);
        pb.inc(1);
    }

    results
}

fn run_benchmark(payload: &[u8], threads: usize, args: &Args) -> BenchmarkResult
{
    let pb = ProgressBar::new(threads.saturating_mul(args.iterations) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise}) {percent}% ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("►■□"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let start_time = Instant::now();
    let deadline = start_time + Duration::from_secs(args.duration);

    let mut results = Vec::new();
    let mut panicked_workers = 0;

    // Todas as threads leem o mesmo payload; cada saída é alocada separadamente
    thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let pb = pb.clone();
                s.spawn(move || worker(payload, args.iterations, deadline, &pb))
            })
            .collect();

        for handle in handles
        {
            match handle.join()
            {
                Ok(worker_results) => results.extend(worker_results),
                Err(_) => panicked_workers += 1,
            }
        }
    });

    let total_time = start_time.elapsed().as_secs_f64();
    pb.finish_with_message(format!("Completo: {} inversões", results.len()));

    summarize(&results, threads, payload.len(), panicked_workers, total_time)
}

fn summarize(
    results: &[CallResult],
    threads: usize,
    payload_bytes: usize,
    panicked_workers: usize,
    total_time: f64,
) -> BenchmarkResult
{
    let successful = results.iter().filter(|r| r.success).count();

    let latencies: Vec<f64> = if results.len() > MAX_LATENCY_SAMPLES
    {
        let mut rng = rand::thread_rng();
        results
            .choose_multiple(&mut rng, MAX_LATENCY_SAMPLES)
            .map(|r| r.duration_ms)
            .collect()
    }
    else
    {
        results.iter().map(|r| r.duration_ms).collect()
    };

    let latency_stats = if !latencies.is_empty()
    {
        Some(LatencyStats {
            min: latencies.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
            max: latencies.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
            mean: latencies.iter().sum::<f64>() / latencies.len() as f64,
            median: percentile(&latencies, 50.0),
            p90: percentile(&latencies, 90.0),
            p99: percentile(&latencies, 99.0),
        })
    }
    else
    {
        None
    };

    let (calls_per_sec, throughput_mib_s) = if total_time > 0.0
    {
        let calls_per_sec = results.len() as f64 / total_time;
        let mib = (successful * payload_bytes) as f64 / (1024.0 * 1024.0);
        (calls_per_sec, mib / total_time)
    }
    else
    {
        (0.0, 0.0)
    };

    BenchmarkResult {
        threads,
        payload_bytes,
        calls: results.len(),
        successful,
        panicked_workers,
        total_time,
        calls_per_sec,
        throughput_mib_s,
        latency_stats,
    }
}

fn percentile(data: &[f64], percentile: f64) -> f64
{
    if data.is_empty()
    {
        return 0.0;
    }

    let mut sorted_data = data.to_vec();
    sorted_data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let index = (sorted_data.len() as f64 - 1.0) * (percentile / 100.0);
    let floor = index.floor() as usize;
    let ceil = index.ceil() as usize;

    if floor == ceil
    {
        return sorted_data[floor];
    }

    let weight = index - floor as f64;
    sorted_data[floor] * (1.0 - weight) + sorted_data[ceil] * weight
}

fn print_results(result: &BenchmarkResult) -> Result<()>
{
    println!("{:=^80}", " Resultados do Benchmark ");
    println!(
        "{:>8} | {:>10} | {:>12} | {:>10} | {:>9} | {:>9} | {:>9}",
        "Threads", "Chamadas", "Chamadas/s", "MiB/s", "Média", "p90", "p99"
    );
    println!("{:-<80}", "");

    match &result.latency_stats
    {
        Some(latency) => println!(
            "{:>8} | {:>10} | {:>12.2} | {:>10.2} | {:>7.3}ms | {:>7.3}ms | {:>7.3}ms",
            result.threads,
            result.calls,
            result.calls_per_sec,
            result.throughput_mib_s,
            latency.mean,
            latency.p90,
            latency.p99
        ),
        None => println!(
            "{:>8} | {:>10} | {:>12.2} | {:>10.2} | {:>9} | {:>9} | {:>9}",
            result.threads, result.calls, result.calls_per_sec, result.throughput_mib_s, "N/A", "N/A", "N/A"
        ),
    }

    if result.successful < result.calls || result.panicked_workers > 0
    {
        println!(
            "{} {} falhas, {} threads abortadas",
            "Aviso:".red().bold(),
            result.calls - result.successful,
            result.panicked_workers
        );
    }

    // Salvar resultados em arquivo
    let results_dir = Path::new(RESULTS_DIR);
    if !results_dir.exists()
    {
        fs::create_dir_all(results_dir)?;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}/benchmark_{}.json", RESULTS_DIR, timestamp);
    let mut file = File::create(&filename).with_context(|| format!("Erro ao criar {}", filename))?;

    writeln!(file, "{}", serde_json::to_string_pretty(result)?)?;

    println!("\nResultados salvos em {}", filename.green());

    Ok(())
}
