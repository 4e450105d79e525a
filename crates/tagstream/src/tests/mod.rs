mod cursor;
mod numbers;
mod parse_good;
mod positions;
mod roundtrip;
mod stringref;
mod utils;
