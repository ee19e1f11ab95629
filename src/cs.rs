pub mod channel;
pub mod compression;
pub mod ecc;
pub mod error;
pub mod transmission;

// Re-export the pipeline entry points
pub use channel::{BinarySymmetricChannel, FixedFlips, FlipSource, NoFlips, RandomFlips};
pub use compression::{build_codebook, decompress, Codebook};
pub use ecc::{decode, derive_codewords, encode_file, pack_bits, unpack_bits, Generator};
pub use transmission::{receive, send, send_over, Envelope, TransferReport, TransmissionConfig};
