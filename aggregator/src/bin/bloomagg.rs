use aggregator::config::Config;
use aggregator::bloom::BloomFilter;
use aggregator::dispatcher::Dispatcher;
use aggregator::error::ErrorPayload;
use aggregator::estimate::BloomGeometry;
use aggregator::telemetry::init_tracing;
use aggregator::wire::{
    AggregateRequest, EncryptRequest, decode_ciphertext, decode_key, encode_blob,
};
use anyhow::{Context as _, anyhow, bail};
use bfv::ciphertext::Ciphertext;
use bfv::context::Context;
use bfv::decryptor::Decryptor;
use bfv::encoder::BatchEncoder;
use bfv::key_generator::KeyGenerator;
use bfv::keys::{GaloisKeys, RelinearizationKey, SecretKey};
use bfv::plaintext::Plaintext;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Encrypted bloom-filter aggregation tool
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the scheme parameters
    Params,

    /// Generate a consumer key set
    Keygen {
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Encrypt a comma-separated vector, or a bloom filter of items, under a public key
    Encrypt {
        #[arg(long)]
        public_key: PathBuf,

        #[arg(long, required_unless_present = "items", conflicts_with = "items")]
        vector: Option<String>,

        /// Comma-separated items inserted into a fresh bloom filter
        #[arg(long, requires_all = ["filter_size", "hash_count"])]
        items: Option<String>,

        #[arg(long)]
        filter_size: Option<usize>,

        #[arg(long)]
        hash_count: Option<usize>,
    },

    /// Multiply ciphertexts slot-wise and sum the slots of the product
    Aggregate {
        #[arg(long)]
        relin_key: PathBuf,

        #[arg(long)]
        galois_key: PathBuf,

        #[arg(required = true)]
        ciphertexts: Vec<PathBuf>,
    },

    /// Decrypt a ciphertext with a secret key
    Decrypt {
        #[arg(long)]
        secret_key: PathBuf,

        #[arg(long)]
        ciphertext: PathBuf,

        #[arg(long, default_value_t = 1)]
        slots: usize,

        #[arg(long, requires = "hash_count")]
        filter_size: Option<usize>,

        #[arg(long, requires = "filter_size")]
        hash_count: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let args: Args = Args::parse();
    let config: Config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    init_tracing(&config.logging.filter);

    match args.command {
        Commands::Params => {
            let dispatcher: Dispatcher = Dispatcher::from_config(&config)?;
            let context: &Context = dispatcher.context();
            println!("poly_modulus_degree: {}", context.n());
            println!("coeff_moduli: {:?}", context.coeff_moduli());
            println!("log_q: {:.2}", context.log_q());
            println!("plain_modulus: {}", context.plain_modulus());
            println!("slots: {}", context.slots());
            println!("security_level: {}", context.params().security_level());
            println!("max_aggregation_inputs: {}", context.max_aggregation_inputs());
            println!("workers: {}", dispatcher.workers());
        }
        Commands::Keygen { out } => {
            let context: Context = Context::new(&config.to_literal()?)?;
            let now: Instant = Instant::now();
            let mut keygen: KeyGenerator = KeyGenerator::new(&context);
            let rlk: RelinearizationKey = keygen.relinearization_key();
            let gk: GaloisKeys = keygen.galois_keys();
            fs::create_dir_all(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            write_blob(&out.join("public.key"), &keygen.public_key().to_bytes(&context))?;
            write_blob(&out.join("secret.key"), &keygen.secret_key().to_bytes(&context))?;
            write_blob(&out.join("relin.key"), &rlk.to_bytes(&context))?;
            write_blob(&out.join("galois.key"), &gk.to_bytes(&context))?;
            info!(key_id = %keygen.key_id(), "Key generation lasted {:?}", now.elapsed());
            println!("{}", keygen.key_id());
        }
        Commands::Encrypt {
            public_key,
            vector,
            items,
            filter_size,
            hash_count,
        } => {
            let bloom_filter: Vec<u64> = match (vector, items, filter_size, hash_count) {
                (Some(vector), _, _, _) => parse_vector(&vector)?,
                (None, Some(items), Some(size), Some(hash_count)) => {
                    if size == 0 || hash_count == 0 {
                        bail!("filter size and hash count must be positive");
                    }
                    let mut filter: BloomFilter =
                        BloomFilter::new(BloomGeometry { size, hash_count });
                    items
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .for_each(|item| filter.insert(item));
                    info!(set_bits = filter.set_bits(), "bloom filter built");
                    filter.as_slice().to_vec()
                }
                _ => bail!("--vector, or --items with --filter-size and --hash-count, is required"),
            };
            let dispatcher: Dispatcher = Dispatcher::from_config(&config)?;
            let request: EncryptRequest = EncryptRequest {
                public_key: read_text(&public_key)?,
                bloom_filter,
            };
            println!("{}", respond(dispatcher.encrypt(&request))?.result);
        }
        Commands::Aggregate {
            relin_key,
            galois_key,
            ciphertexts,
        } => {
            let dispatcher: Dispatcher = Dispatcher::from_config(&config)?;
            let request: AggregateRequest = AggregateRequest {
                serialized_galois_keys: read_text(&galois_key)?,
                serialized_relin_keys: read_text(&relin_key)?,
                encrypted_bloom_filters: ciphertexts
                    .iter()
                    .map(|path| read_text(path))
                    .collect::<anyhow::Result<_>>()?,
            };
            println!("{}", respond(dispatcher.aggregate(&request))?.result);
        }
        Commands::Decrypt {
            secret_key,
            ciphertext,
            slots,
            filter_size,
            hash_count,
        } => {
            let context: Context = Context::new(&config.to_literal()?)?;
            let sk: SecretKey =
                SecretKey::from_bytes(&context, &decode_key(&read_text(&secret_key)?)?)?;
            let ct: Ciphertext =
                Ciphertext::from_bytes(&context, &decode_ciphertext(&read_text(&ciphertext)?)?)?;
            let decryptor: Decryptor = Decryptor::new(&context, &sk);
            let pt: Plaintext = decryptor.decrypt(&ct)?;
            let values: Vec<u64> = BatchEncoder::new(&context).decode(&pt);
            let shown: &[u64] = &values[..slots.min(values.len())];
            println!(
                "slots: {}",
                shown.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
            );
            if let (Some(size), Some(hash_count)) = (filter_size, hash_count) {
                let geometry: BloomGeometry = BloomGeometry { size, hash_count };
                match geometry.cardinality(values[0]) {
                    Some(estimate) => println!("estimated_items: {}", estimate),
                    None => println!("estimated_items: saturated"),
                }
            }
            println!(
                "noise_budget_bits: {:.1}",
                decryptor.invariant_noise_budget(&ct)?
            );
        }
    }
    Ok(())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_blob(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    fs::write(path, encode_blob(bytes)).with_context(|| format!("writing {}", path.display()))
}

fn parse_vector(csv: &str) -> anyhow::Result<Vec<u64>> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().with_context(|| format!("invalid slot value {:?}", s)))
        .collect()
}

fn respond<T>(response: Result<T, ErrorPayload>) -> anyhow::Result<T> {
    response.map_err(|payload| match serde_json::to_string(&payload) {
        Ok(json) => anyhow!(json),
        Err(_) => anyhow!(payload.error.message),
    })
}
