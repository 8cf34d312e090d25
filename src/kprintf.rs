//! `%`-format strings for kernel diagnostics: `%d`, `%x`, `%p`, `%s`, `%%`.

/// One argument to a `cprintf` format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    Int(i32),
    Uint(u32),
    Ptr(usize),
    /// `None` prints as `(null)`.
    Str(Option<&'a str>),
}

impl<'a> Arg<'a> {
    /// Value printed by `%d`; unsigned arguments are reinterpreted as `i32`.
    fn signed(&self) -> Option<i64> {
        match *self {
            Arg::Int(v) => Some(v as i64),
            Arg::Uint(v) => Some(v as i32 as i64),
            Arg::Ptr(v) => Some(v as i64),
            Arg::Str(_) => None,
        }
    }

    /// Value printed by `%x` and `%p`.
    fn bits(&self) -> Option<u64> {
        match *self {
            Arg::Int(v) => Some(v as u32 as u64),
            Arg::Uint(v) => Some(v as u64),
            Arg::Ptr(v) => Some(v as u64),
            Arg::Str(_) => None,
        }
    }
}

impl From<i32> for Arg<'_> {
    fn from(v: i32) -> Self {
        Arg::Int(v)
    }
}

impl From<u32> for Arg<'_> {
    fn from(v: u32) -> Self {
        Arg::Uint(v)
    }
}

impl From<usize> for Arg<'_> {
    fn from(v: usize) -> Self {
        Arg::Ptr(v)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Arg::Str(Some(s))
    }
}

impl<'a> From<Option<&'a str>> for Arg<'a> {
    fn from(s: Option<&'a str>) -> Self {
        Arg::Str(s)
    }
}

fn print_number(mut x: u64, base: u64, negative: bool, emit: &mut impl FnMut(u8)) {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut buf = [0u8; 24];
    let mut i = 0;
    loop {
        buf[i] = DIGITS[(x % base) as usize];
        i += 1;
        x /= base;
        if x == 0 {
            break;
        }
    }
    if negative {
        buf[i] = b'-';
        i += 1;
    }
    for &digit in buf[..i].iter().rev() {
        emit(digit);
    }
}

/// Expands `fmt` against `args`, handing each output byte to `emit`.
///
/// Unknown conversions, and conversions whose argument is missing or of the
/// wrong kind, are echoed literally. A `%` ending the string prints nothing.
/// A null format string is fatal.
pub fn format(fmt: Option<&str>, args: &[Arg], mut emit: impl FnMut(u8)) {
    let Some(fmt) = fmt else {
        panic!("null fmt");
    };

    let mut args = args.iter();
    let mut bytes = fmt.bytes();
    while let Some(c) = bytes.next() {
        if c != b'%' {
            emit(c);
            continue;
        }
        let Some(conv) = bytes.next() else {
            break;
        };
        let printed = match conv {
            b'd' => args.next().and_then(Arg::signed).map(|v| {
                print_number(v.unsigned_abs(), 10, v < 0, &mut emit);
            }),
            b'x' | b'p' => args.next().and_then(Arg::bits).map(|v| {
                print_number(v, 16, false, &mut emit);
            }),
            b's' => match args.next() {
                Some(Arg::Str(s)) => {
                    s.unwrap_or("(null)").bytes().for_each(&mut emit);
                    Some(())
                }
                _ => None,
            },
            b'%' => {
                emit(b'%');
                Some(())
            }
            _ => None,
        };
        if printed.is_none() {
            emit(b'%');
            emit(conv);
        }
    }
}
