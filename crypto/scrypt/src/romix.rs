use crate::{
    salsa::{xor_salsa20_8, Block},
    Error,
};
use crypto_common::erase::{Erase, Erased};

/// Working memory of one ROMix lane: the `n`-entry table `V` plus one
/// temporary of the same size as a lane.
///
/// Both buffers are wiped when the scratch is dropped.
pub(crate) struct Scratch {
    v: Erased<Vec<u8>>,
    t: Erased<Vec<u8>>,
    n: usize,
}

impl Scratch {
    /// Reserves `128 * r * n` bytes for the table, reporting allocation
    /// failure instead of aborting.
    pub(crate) fn allocate(r: usize, n: usize) -> Result<Self, Error> {
        let lane = r
            .checked_mul(128)
            .ok_or(Error::InvalidParameter("r is too large"))?;
        let table = lane
            .checked_mul(n)
            .ok_or(Error::InvalidParameter("128 * r * N overflows"))?;
        Ok(Self {
            v: try_alloc(table)?,
            t: try_alloc(lane)?,
            n,
        })
    }

    #[allow(clippy::many_single_char_names)]
    pub(crate) fn ro_mix(&mut self, b: &mut [u8]) {
        let Self { v, t, n } = self;
        let len = b.len();
        debug_assert_eq!(v.len(), len * *n, "scratch sized for another lane");
        for chunk in v.chunks_mut(len) {
            chunk.copy_from_slice(b);
            block_mix(chunk, b);
        }
        for _ in 0..*n {
            let j = integerify(b, *n);
            xor(b, &v[j * len..(j + 1) * len], t);
            block_mix(t, b);
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn try_alloc(len: usize) -> Result<Erased<Vec<u8>>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory(len as u64))?;
    buf.resize(len, 0);
    Ok(Erased::new(buf))
}

/// ROMix over a single lane of `2r` blocks with cost `n`, in place.
///
/// Allocates its own `128 * r * n` byte table, which is wiped and released
/// before returning.
pub fn ro_mix(b: &mut [u8], n: usize) -> Result<(), Error> {
    if b.is_empty() || b.len() % 128 != 0 {
        return Err(Error::InvalidParameter(
            "lane must be a non-empty multiple of 128 bytes",
        ));
    }
    if n < 2 || !n.is_power_of_two() {
        return Err(Error::InvalidParameter("N must be a power of two greater than 1"));
    }
    let mut scratch = Scratch::allocate(b.len() / 128, n)?;
    scratch.ro_mix(b);
    Ok(())
}

/// BlockMix with Salsa20/8: `input` and `output` are both `2r` 64-byte
/// blocks.
///
/// Block `i` of the mixed sequence lands at `i / 2` when `i` is even and at
/// `r + i / 2` when it is odd.
///
/// # Panics
///
/// If the buffers differ in length or are not a non-empty multiple of 128
/// bytes.
pub fn block_mix(input: &[u8], output: &mut [u8]) {
    assert!(
        !input.is_empty() && input.len() % 128 == 0 && input.len() == output.len(),
        "block_mix needs two equal buffers of 2r blocks"
    );
    let half = input.len() / 2;
    let mut x: Block = [0; 64];
    x.copy_from_slice(&input[input.len() - 64..]);
    for (i, chunk) in input.chunks_exact(64).enumerate() {
        xor_salsa20_8(&mut x, chunk);
        let pos = if i % 2 == 0 {
            (i / 2) * 64
        } else {
            (i / 2) * 64 + half
        };
        output[pos..pos + 64].copy_from_slice(&x);
    }
    x.erase();
}

// low bits of the first word of the last block, read little-endian
#[allow(clippy::cast_possible_truncation)]
fn integerify(x: &[u8], n: usize) -> usize {
    let mut word = [0; 8];
    word.copy_from_slice(&x[x.len() - 64..x.len() - 56]);
    let mask = (n - 1) as u64;
    (u64::from_le_bytes(word) & mask) as usize
}

fn xor(x: &[u8], y: &[u8], output: &mut [u8]) {
    for ((out, &x_i), &y_i) in output.iter_mut().zip(x.iter()).zip(y.iter()) {
        *out = x_i ^ y_i;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{salsa::salsa20_8, test_util::unhex};

    const INPUT: &str = "f7ce0b653d2d72a4108cf5abe912ffdd777616dbbb27a70e8204f3ae2d0f6fad\
                         89f68f4811d1e87bcc3bd7400a9ffd29094f0184639574f39ae5a1315217bcd7\
                         894991447213bb226c25b54da86370fbcd984380374666bb8ffcb5bf40c254b0\
                         67d27c51ce4ad5fed829c90b505a571b7f4d1cad6a523cda770e67bceaaf7e89";

    fn block(bytes: &[u8]) -> Block {
        let mut out = [0; 64];
        out.copy_from_slice(bytes);
        out
    }

    fn xor_blocks(a: &[u8], b: &[u8]) -> Block {
        let mut out = [0; 64];
        xor(a, b, &mut out);
        out
    }

    // RFC 7914, section 9
    #[test]
    fn block_mix_vector() {
        let input = unhex(INPUT);
        let mut output = vec![0; 128];
        block_mix(&input, &mut output);
        assert_eq!(
            output,
            unhex(
                "a41f859c6608cc993b81cacb020cef05044b2181a2fd337dfd7b1c6396682f29\
                 b4393168e3c9e6bcfe6bc5b7a06d96bae424cc102c91745c24ad673dc7618f81\
                 20edc975323881a80540f64c162dcd3c21077cfe5f8d5fe2b1a4168f953678b7\
                 7d3b3d803b60e4ab920996e59b4d53b65d2a225877d5edf5842cb9f14eefe425"
            )
        );
    }

    #[test]
    fn block_mix_with_one_block_pair_is_two_salsa_steps() {
        let input = unhex(INPUT);
        let (b0, b1) = input.split_at(64);
        let y0 = salsa20_8(&xor_blocks(b1, b0));
        let y1 = salsa20_8(&xor_blocks(&y0, b1));
        let mut output = vec![0; 128];
        block_mix(&input, &mut output);
        assert_eq!(output[..64], y0);
        assert_eq!(output[64..], y1);
    }

    #[test]
    fn block_mix_interleaves_even_and_odd_blocks() {
        let input: Vec<u8> = (0..256_u32).map(|i| (i * 7 + 3) as u8).collect();
        let blocks: Vec<&[u8]> = input.chunks_exact(64).collect();
        let mut x = block(blocks[3]);
        let mut mixed = Vec::new();
        for b in &blocks {
            x = salsa20_8(&xor_blocks(&x, b));
            mixed.push(x);
        }
        let mut output = vec![0; 256];
        block_mix(&input, &mut output);
        assert_eq!(output[..64], mixed[0]);
        assert_eq!(output[64..128], mixed[2]);
        assert_eq!(output[128..192], mixed[1]);
        assert_eq!(output[192..], mixed[3]);
    }

    #[test]
    #[should_panic(expected = "block_mix needs two equal buffers")]
    fn block_mix_rejects_mismatched_buffers() {
        let mut output = vec![0; 64];
        block_mix(&[0; 128], &mut output);
    }

    // RFC 7914, section 10
    #[test]
    fn ro_mix_vector() {
        let mut b = unhex(INPUT);
        ro_mix(&mut b, 16).unwrap();
        assert_eq!(
            b,
            unhex(
                "79ccc193629debca047f0b70604bf6b62ce3dd4a9626e355fafc6198e6ea2b46\
                 d58413673b99b029d665c357601fb426a0b2f4bba200ee9f0a43d19b571a9c71\
                 ef1142e65d5a266fddca832ce59faa7cac0b9cf1be2bffca300d01ee387619c4\
                 ae12fd4438f203a0e4e1c47ec314861f4e9087cb33396a6873e8f9d2539a4b8e"
            )
        );
    }

    #[test]
    fn scratch_can_be_reused_across_lanes() {
        let mut scratch = Scratch::allocate(1, 16).unwrap();
        let mut first = unhex(INPUT);
        let mut second = unhex(INPUT);
        scratch.ro_mix(&mut first);
        scratch.ro_mix(&mut second);
        assert_eq!(first, second);

        let mut fresh = unhex(INPUT);
        ro_mix(&mut fresh, 16).unwrap();
        assert_eq!(first, fresh);
    }

    #[test]
    fn ro_mix_rejects_bad_shapes() {
        let mut b = vec![0; 128];
        for n in [0, 1, 3, 12] {
            assert!(matches!(ro_mix(&mut b, n), Err(Error::InvalidParameter(_))));
        }
        assert!(matches!(
            ro_mix(&mut [0; 64], 16),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(ro_mix(&mut [], 16), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn integerify_reads_last_block_little_endian() {
        let mut b = vec![0; 128];
        b[64..72].copy_from_slice(&0x0102_0304_0506_0708_u64.to_le_bytes());
        assert_eq!(integerify(&b, 16), 0x8);
        assert_eq!(integerify(&b, 1 << 16), 0x0708);
        assert_eq!(integerify(&b, 1 << 40), 0x04_0506_0708);
    }

    #[test]
    fn oversized_scratch_is_refused() {
        assert!(matches!(
            Scratch::allocate(usize::MAX / 64, 2),
            Err(Error::InvalidParameter(_))
        ));
    }

    // 128 * 2^30 * 2^26 = 2^63 bytes: representable, but beyond isize::MAX
    #[cfg(target_pointer_width = "64")]
    #[test]
    fn unallocatable_scratch_is_out_of_memory() {
        match Scratch::allocate(1 << 30, 1 << 26) {
            Err(err @ Error::OutOfMemory(len)) => {
                assert_eq!(len, 1 << 63);
                assert!(!err.is_invalid_parameter());
            }
            Err(err) => panic!("expected OutOfMemory, got {err:?}"),
            Ok(_) => panic!("2^63 bytes of scratch were allocated"),
        }
    }
}
