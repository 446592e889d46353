use crate::{
    signing_payload, Amount, Ed25519Verifier, EpochHandler, Keypair, OutputIndex, Sha256,
    Transaction, TransactionId, TransactionInput, TransactionOutput, UtxoId, UtxoPool,
};
use clap::{App, Arg, ArgMatches};
use std::error::Error;

const GENESIS_AMOUNT: i64 = 50;

struct EpochCliOptions {
    participants: usize,
    seed: u64,
}

impl EpochCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let participants = matches.value_of("participants").unwrap().parse::<usize>()?;
        let seed = match matches.value_of("seed") {
            Some(seed) => seed.parse::<u64>()?,
            None => rand::random::<u64>(),
        };
        Ok(Self { participants, seed })
    }
}

pub fn epoch_command() -> App<'static> {
    App::new("epoch")
        .version("0.1")
        .about("Runs one epoch over a generated batch of candidate transactions.")
        .arg(
            Arg::new("participants")
                .short('p')
                .long("participants")
                .value_name("COUNT")
                .help("Number of keypairs that own the genesis outputs.")
                .takes_value(true)
                .default_value("4"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("SEED")
                .help("Seed for deterministic keypair derivation. Random if omitted.")
                .takes_value(true),
        )
}

pub fn run_epoch_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = EpochCliOptions::parse(matches)?;
    if options.participants < 2 {
        return Err("At least two participants are required.".into());
    }
    println!("Running one epoch with seed: {}", options.seed);

    let keypairs = (0..options.participants)
        .map(|index| participant_keypair(options.seed, index))
        .collect::<Vec<Keypair>>();
    let (genesis_id, pool) = genesis_pool(&keypairs)?;
    let candidates = demo_candidates(genesis_id, &keypairs)?;

    let handler = EpochHandler::new(&Ed25519Verifier);
    let outcome = handler.handle_epoch(pool, candidates)?;

    println!("Accepted {} candidate(s):", outcome.accepted().len());
    for transaction in outcome.accepted() {
        println!("  {}", transaction.id());
    }
    println!("Rejected {} candidate(s):", outcome.rejected().len());
    for (transaction, reason) in outcome.rejected() {
        println!("  {}: {}", transaction.id(), reason);
    }

    let mut balances = outcome
        .pool()
        .address_balances()
        .into_iter()
        .collect::<Vec<_>>();
    balances.sort_by_key(|(address, _)| *address);
    println!("Balances after the epoch:");
    for (address, amount) in balances {
        println!("  {}: {}", address, amount);
    }
    Ok(())
}

/// Each participant's keypair derives from the run seed and their index, so the
/// same seed reproduces the same run.
fn participant_keypair(seed: u64, index: usize) -> Keypair {
    let mut data = seed.to_be_bytes().to_vec();
    data.extend_from_slice(&(index as u64).to_be_bytes());
    let digest = Sha256::digest(&data);
    let mut key_seed = [0; 32];
    key_seed.copy_from_slice(digest.as_slice());
    Keypair::from_seed(key_seed)
}

/// The initial pool the host supplies: one genesis output per participant, plus
/// two extra outputs for the first participant that fund the doomed candidates.
/// All entries are keyed by a fabricated genesis identity.
fn genesis_pool(keypairs: &Vec<Keypair>) -> Result<(TransactionId, UtxoPool), String> {
    let genesis_id = TransactionId::new(Sha256::digest(b"epochcoin genesis"));
    let mut pool = UtxoPool::new();
    for (index, keypair) in keypairs.iter().enumerate() {
        pool.insert(
            UtxoId::new(genesis_id, OutputIndex::new(index as u32)),
            TransactionOutput::new(keypair.address(), Amount::new(GENESIS_AMOUNT)),
        )?;
    }
    for extra in 0..2 {
        pool.insert(
            UtxoId::new(
                genesis_id,
                OutputIndex::new((keypairs.len() + extra) as u32),
            ),
            TransactionOutput::new(keypairs[0].address(), Amount::new(GENESIS_AMOUNT)),
        )?;
    }
    Ok((genesis_id, pool))
}

/// One honest transfer per participant to its neighbour, plus three doomed
/// candidates: a conflicting claim on an already-spent output, an inflating
/// spend, and a claim signed by the wrong key.
fn demo_candidates(
    genesis_id: TransactionId,
    keypairs: &Vec<Keypair>,
) -> Result<Vec<Transaction>, String> {
    let count = keypairs.len();
    let mut candidates = Vec::new();
    for (index, keypair) in keypairs.iter().enumerate() {
        let recipient = &keypairs[(index + 1) % count];
        candidates.push(transfer(
            genesis_id,
            index as u32,
            keypair,
            recipient,
            GENESIS_AMOUNT,
        )?);
    }
    // Claims the same genesis output as the first honest transfer. It is listed
    // later, so presentation order settles the conflict against it.
    candidates.push(transfer(
        genesis_id,
        0,
        &keypairs[0],
        &keypairs[2 % count],
        GENESIS_AMOUNT,
    )?);
    // Tries to mint more value than it claims.
    candidates.push(transfer(
        genesis_id,
        count as u32,
        &keypairs[0],
        &keypairs[1],
        GENESIS_AMOUNT + 25,
    )?);
    // Signed by a key that does not own the claimed output.
    candidates.push(transfer(
        genesis_id,
        (count + 1) as u32,
        &keypairs[1],
        &keypairs[1],
        GENESIS_AMOUNT,
    )?);
    Ok(candidates)
}

fn transfer(
    genesis_id: TransactionId,
    output_index: u32,
    signer: &Keypair,
    recipient: &Keypair,
    amount: i64,
) -> Result<Transaction, String> {
    let outputs = vec![TransactionOutput::new(
        recipient.address(),
        Amount::new(amount),
    )];
    let output_index = OutputIndex::new(output_index);
    let payload = signing_payload(&genesis_id, &output_index, &outputs)?;
    let input = TransactionInput::new(genesis_id, output_index, signer.sign(&payload));
    Transaction::new(vec![input], outputs)
}
