use std::sync::Arc;
use std::time::Instant;

use eyre::Result;

use pilecall_core_rs::loc::{GenomeSpace, Interval, Locus, Orientation};
use pilecall_core_rs::parallelism;
use pilecall_io_rs::{bed, chrom_sizes};
use pilecall_macs2_rs::{BedGraphDump, Macs2, Macs2Params, NoListener};

const THREADS: isize = 0;
const FRAGMENT_LENGTH: u64 = 200;
const READ_LENGTH: i64 = 50;
const CHUNK_SIZE: usize = 250_000;

// Synthetic genome: background reads everywhere and enriched clusters every CLUSTER_EVERY bases
const GENOME: &[(&str, u64)] = &[
    ("chr1", 248_387_328),
    ("chr2", 242_696_752),
    ("chr3", 201_105_948),
];
const BACKGROUND_EVERY: u64 = 2_000;
const CLUSTER_EVERY: u64 = 1_000_000;
const CLUSTER_READS: u64 = 50;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

/// Deterministic xorshift, enough to jitter read positions.
struct Jitter(u64);

impl Jitter {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0 % bound
    }
}

fn synthetic() -> Result<(GenomeSpace, Vec<Locus<i64>>)> {
    let genome = GenomeSpace::build(GENOME.iter().map(|(name, size)| (*name, *size)))?;

    let mut jitter = Jitter(0x2545_f491_4f6c_dd1d);
    let mut reads = Vec::new();
    for (contig, size) in GENOME {
        let mut push = |start: u64, jitter: &mut Jitter| -> Result<()> {
            let start = start as i64;
            let orientation = if jitter.next(2) == 0 {
                Orientation::Forward
            } else {
                Orientation::Reverse
            };
            reads.push(Locus::new(
                contig.to_string(),
                Interval::new(start, start + READ_LENGTH)?,
                orientation,
            ));
            Ok(())
        };

        for start in (0..size - BACKGROUND_EVERY).step_by(BACKGROUND_EVERY as usize) {
            let offset = jitter.next(BACKGROUND_EVERY);
            push(start + offset, &mut jitter)?;
        }
        for center in (CLUSTER_EVERY..size - CLUSTER_EVERY).step_by(CLUSTER_EVERY as usize) {
            for _ in 0..CLUSTER_READS {
                let offset = jitter.next(FRAGMENT_LENGTH);
                push(center + offset, &mut jitter)?;
            }
        }
    }
    Ok((genome, reads))
}

/// Usage: `pilecall-macs2-bench [reads.bed[.gz] chrom.sizes [output-prefix]]`
fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (genome, reads) = match args.as_slice() {
        [_, reads, sizes, ..] => {
            let genome = GenomeSpace::build(chrom_sizes::read_path(sizes)?)?;
            let reads = bed::Reader::from_path(reads)?.read_all()?;
            (genome, reads)
        }
        _ => synthetic()?,
    };
    let genome = Arc::new(genome);
    println!(
        "Genome: {} chromosomes, {} bases; reads: {}",
        genome.len(),
        genome.size(),
        reads.len()
    );

    let params = Macs2Params::derive(&reads, &genome)
        .set_fragment_length(FRAGMENT_LENGTH)
        .set_threads(THREADS)
        .build()?;
    println!("Threads: {}", parallelism::available(THREADS)?);
    let caller = Macs2::new(genome, params)?;

    let peaks = {
        #[cfg(feature = "dhat-heap")]
        let _profiler = dhat::Profiler::new_heap();

        let start = Instant::now();
        let mut accumulator = caller.accumulator();
        for chunk in reads.chunks(CHUNK_SIZE) {
            accumulator.add(chunk)?;
        }
        let peaks = match args.get(3) {
            Some(prefix) => accumulator.finish(&mut BedGraphDump::new(prefix.as_str())),
            None => accumulator.finish(&mut NoListener),
        }?;
        println!("Peak calling took {:.2?}", start.elapsed());
        peaks
    };

    println!("Peaks: {}", peaks.len());
    for peak in peaks.iter().take(10) {
        println!(
            "\t{}:{} {} signal={:.3} p={:.3}",
            peak.contig(),
            peak.interval(),
            peak.name(),
            peak.signal_value(),
            peak.p_value()
        );
    }
    Ok(())
}
