use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use sealkit_core::VERSION;

/// Sealkit - RSA keys, password envelopes and signed forms from the command line
#[derive(Parser)]
#[command(name = "sealkit")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "SEALKIT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Arguments for the `keygen` command
#[derive(Args)]
pub struct KeygenArgs {
    /// Directory that receives public.pem and private.pem
    #[arg(long, value_name = "DIR")]
    pub out_dir: String,

    /// Modulus size in bits (overrides config)
    #[arg(long)]
    pub bits: Option<usize>,

    /// Lock the private key with a password
    #[arg(long)]
    pub encrypt: bool,

    /// Private key cipher for --encrypt, e.g. scrypt-aes-256-cbc or
    /// pbkdf2-sha256-aes-256-cbc (overrides config)
    #[arg(long, requires = "encrypt")]
    pub key_cipher: Option<String>,

    /// Replace existing key files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `encrypt` command
#[derive(Args)]
pub struct EncryptArgs {
    /// Input file (stdin when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Symmetric cipher, e.g. AES-256-CBC or AES-256-GCM (overrides config)
    #[arg(long)]
    pub cipher: Option<String>,

    /// Password hash used to derive the key (overrides config)
    #[arg(long)]
    pub hash: Option<String>,

    /// Write the ciphertext as raw bytes instead of base64
    #[arg(long)]
    pub raw: bool,

    /// Pad with zero bytes instead of PKCS#7 (CBC only)
    #[arg(long)]
    pub zero_padding: bool,
}

/// Arguments for the `sign` command
#[derive(Args)]
pub struct SignArgs {
    /// Private key file
    #[arg(long, value_name = "KEY")]
    pub private: String,

    /// Input file (stdin when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Signature digest (overrides config)
    #[arg(long)]
    pub algo: Option<String>,
}

/// Arguments for the `verify` command
#[derive(Args)]
pub struct VerifyArgs {
    /// Public key file
    #[arg(long, value_name = "KEY")]
    pub public: String,

    /// Base64 signature
    #[arg(long, value_name = "SIG")]
    pub signature: String,

    /// Input file (stdin when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Signature digest (overrides config)
    #[arg(long)]
    pub algo: Option<String>,
}

/// Arguments for the `hash` command
#[derive(Args)]
pub struct HashArgs {
    /// File to hash
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Digest algorithm
    #[arg(long, conflicts_with = "check")]
    pub algo: Option<String>,

    /// Compare against a hex digest instead of printing one
    #[arg(long, value_name = "HEX")]
    pub check: Option<String>,
}

/// Arguments for the `form-sign` command
#[derive(Args)]
pub struct FormSignArgs {
    /// Credentials file (overrides config)
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<String>,

    /// Form name
    #[arg(long)]
    pub name: String,

    /// Client address the form is served to
    #[arg(long)]
    pub ip: String,

    /// Attestation lifetime, e.g. "2h", "30m" (overrides config)
    #[arg(long)]
    pub ttl: Option<String>,

    /// Field group the attestation is nested under (overrides config)
    #[arg(long)]
    pub group: Option<String>,

    /// Print the signed form as HTML instead of field pairs
    #[arg(long, conflicts_with = "json")]
    pub html: bool,

    /// Print the hidden fields as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `form-verify` command
#[derive(Args)]
pub struct FormVerifyArgs {
    /// Credentials file (overrides config)
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<String>,

    /// Submitted form fields as JSON, or @FILE to read them from a file
    #[arg(long, value_name = "JSON")]
    pub fields: String,

    /// Address the submission came from
    #[arg(long)]
    pub ip: String,

    /// Field group the attestation is nested under (overrides config)
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an RSA key pair
    Keygen(KeygenArgs),

    /// Print the fingerprint of a key file
    Fingerprint {
        /// Public or private key file
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Encrypt data into a password envelope
    Encrypt(EncryptArgs),

    /// Decrypt a password envelope
    Decrypt {
        /// Input file (stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<String>,
    },

    /// Sign data with a private key
    Sign(SignArgs),

    /// Verify a signature with a public key
    Verify(VerifyArgs),

    /// Print or check a file digest
    Hash(HashArgs),

    /// Sign a form and print its hidden inputs
    FormSign(FormSignArgs),

    /// Verify the attestation in submitted form fields
    FormVerify(FormVerifyArgs),

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}
