use super::hw::{Address, Byte, LabelId, Word};
use derive_more::Constructor;
use static_assertions::const_assert_eq;
use std::fmt::Display;

/*
    Module layout (all multi-byte integers big-endian):

        offset  size  field
        0       4     magic
        4       1     format version
        5       1     compression flag
        6       4     entry point (code-section-relative byte address)
        10      2     stack size hint
        12      4     checksum (reserved, zero)
        16      4     label count
        20      6*n   label records, {id: 2, address: 4}
        ...           code
*/

pub const MAGIC: [Byte; 4] = *b"KL27";
pub const VERSION: Byte = 1;
pub const UNCOMPRESSED: Byte = 0;
pub const DEFAULT_STACK_SIZE: Word = 4;

pub const HEADER_LEN: usize = 4 + 1 + 1 + 4 + 2 + 4;
const_assert_eq!(HEADER_LEN, 16);

pub const LABEL_COUNT_LEN: usize = 4;
pub const LABEL_RECORD_LEN: usize = 2 + 4;
const_assert_eq!(LABEL_RECORD_LEN, 6);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Truncated(&'static str),
    BadMagic([Byte; 4]),
    UnsupportedVersion(Byte),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Truncated(what) => write!(f, "Module truncated while reading the {}", what),
            Error::BadMagic(magic) => write!(f, "Bad magic bytes: {:02X?}", magic),
            Error::UnsupportedVersion(v) => write!(f, "Unsupported module version: {}", v),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: Byte,
    pub compression: Byte,
    pub entry: Address,
    pub stack_size: Word,
    pub checksum: u32,
}

impl Header {
    pub fn new(entry: Address, stack_size: Word) -> Self {
        Header {
            version: VERSION,
            compression: UNCOMPRESSED,
            entry,
            stack_size,
            checksum: 0,
        }
    }

    fn write(&self, out: &mut Vec<Byte>) {
        out.extend_from_slice(&MAGIC);
        out.push(self.version);
        out.push(self.compression);
        out.extend_from_slice(&self.entry.to_be_bytes());
        out.extend_from_slice(&self.stack_size.to_be_bytes());
        out.extend_from_slice(&self.checksum.to_be_bytes());
    }

    fn read(r: &mut Reader) -> Result<Self, Error> {
        let magic = r.array::<[Byte; 4]>("magic")?;
        if magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }

        let version = r.byte("version")?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        Ok(Header {
            version,
            compression: r.byte("compression flag")?,
            entry: u32::from_be_bytes(r.array("entry point")?),
            stack_size: u16::from_be_bytes(r.array("stack size")?),
            checksum: u32::from_be_bytes(r.array("checksum")?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct LabelRecord {
    pub id: LabelId,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Module {
    pub header: Header,
    pub labels: Vec<LabelRecord>,
    pub code: Vec<Byte>,
}

impl Module {
    pub fn len(&self) -> usize {
        HEADER_LEN + LABEL_COUNT_LEN + LABEL_RECORD_LEN * self.labels.len() + self.code.len()
    }

    pub fn to_bytes(&self) -> Vec<Byte> {
        let mut out = Vec::with_capacity(self.len());
        self.header.write(&mut out);

        // The label count is bounded by the id width, so this never truncates.
        out.extend_from_slice(&(self.labels.len() as u32).to_be_bytes());
        for rec in &self.labels {
            out.extend_from_slice(&rec.id.to_be_bytes());
            out.extend_from_slice(&rec.address.to_be_bytes());
        }

        out.extend_from_slice(&self.code);
        out
    }

    pub fn from_bytes(raw: &[Byte]) -> Result<Self, Error> {
        let mut r = Reader { raw };
        let header = Header::read(&mut r)?;

        let count = u32::from_be_bytes(r.array("label count")?);
        let mut labels = Vec::new();
        for _ in 0..count {
            labels.push(LabelRecord {
                id: u16::from_be_bytes(r.array("label table")?),
                address: u32::from_be_bytes(r.array("label table")?),
            });
        }

        Ok(Module {
            header,
            labels,
            code: r.raw.to_vec(),
        })
    }

    pub fn address_of(&self, id: LabelId) -> Option<Address> {
        self.labels
            .iter()
            .find(|rec| rec.id == id)
            .map(|rec| rec.address)
    }
}

struct Reader<'a> {
    raw: &'a [Byte],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [Byte], Error> {
        if self.raw.len() < n {
            return Err(Error::Truncated(what));
        }
        let (head, tail) = self.raw.split_at(n);
        self.raw = tail;
        Ok(head)
    }

    fn byte(&mut self, what: &'static str) -> Result<Byte, Error> {
        Ok(self.take(1, what)?[0])
    }

    fn array<A>(&mut self, what: &'static str) -> Result<A, Error>
    where
        A: Default + AsMut<[Byte]>,
    {
        let mut buf = A::default();
        let len = buf.as_mut().len();
        buf.as_mut().copy_from_slice(self.take(len, what)?);
        Ok(buf)
    }
}
