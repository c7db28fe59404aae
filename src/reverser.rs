use crate::errors::ReverseError;

/// Returns a new buffer holding the bytes of `input` in reverse order.
///
/// The input is only borrowed; the returned `Vec` is owned by the caller.
/// Empty input yields an empty (not absent) buffer.
///
/// # Errors
/// `ReverseError::AllocationFailure` if the output buffer cannot be reserved.
pub fn reverse(input: &[u8]) -> Result<Vec<u8>, ReverseError>
{
    reverse_with_headroom(input, 0)
}

/// Same as [`reverse`], but leaves `headroom` bytes of spare capacity after
/// the payload so the caller can append (a terminator, for instance) without
/// reallocating.
pub fn reverse_with_headroom(input: &[u8], headroom: usize) -> Result<Vec<u8>, ReverseError>
{
    let mut output = allocate(input.len(), headroom)?;
    output.extend(input.iter().rev());

    debug_assert_eq!(output.len(), input.len());
    Ok(output)
}

/// Reverses the UTF-8 bytes of `input`.
///
/// The result is returned as bytes: reversing the code units of a multi-byte
/// character does not produce valid UTF-8.
pub fn reverse_str(input: &str) -> Result<Vec<u8>, ReverseError>
{
    reverse(input.as_bytes())
}

fn allocate(len: usize, headroom: usize) -> Result<Vec<u8>, ReverseError>
{
    let mut buffer = Vec::new();
    let requested = len.saturating_add(headroom);

    // usize::MAX is never a valid capacity, so a saturated request still fails
    buffer
        .try_reserve_exact(requested)
        .map_err(|source| ReverseError::AllocationFailure { requested, source })?;

    Ok(buffer)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn reverses_hello()
    {
        assert_eq!(reverse(b"hello").unwrap(), b"olleh");
    }

    #[test]
    fn empty_input_gives_empty_output()
    {
        let out = reverse(b"").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn single_and_pair()
    {
        assert_eq!(reverse(b"a").unwrap(), b"a");
        assert_eq!(reverse(b"ab").unwrap(), b"ba");
    }

    #[test]
    fn embedded_nul_is_payload()
    {
        assert_eq!(reverse(&[0x01, 0x00, 0x02]).unwrap(), vec![0x02, 0x00, 0x01]);
    }

    #[test]
    fn one_mebibyte_of_identical_bytes()
    {
        let input = vec![b'x'; 1_048_576];
        let out = reverse(&input).unwrap();
        assert_eq!(out.len(), 1_048_576);
        assert_eq!(out, input);
    }

    #[test]
    fn headroom_is_spare_capacity()
    {
        let out = reverse_with_headroom(b"abc", 1).unwrap();
        assert_eq!(out, b"cba");
        assert!(out.capacity() >= 4);
    }

    #[test]
    fn capacity_is_exact()
    {
        // the C exports hand these buffers out as boxed slices
        assert_eq!(reverse(b"abc").unwrap().capacity(), 3);
        assert_eq!(reverse_with_headroom(b"abc", 1).unwrap().capacity(), 4);
    }

    #[test]
    fn oversized_request_is_an_error()
    {
        let err = reverse_with_headroom(b"abc", usize::MAX).unwrap_err();
        match err
        {
            ReverseError::AllocationFailure { requested, .. } => assert_eq!(requested, usize::MAX),
        }
    }

    #[test]
    fn reverse_str_works_on_bytes()
    {
        assert_eq!(reverse_str("stressed").unwrap(), b"desserts");
        // "é" is two bytes; they come back swapped
        assert_eq!(reverse_str("é").unwrap(), vec![0xA9, 0xC3]);
    }
}
