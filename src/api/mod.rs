pub mod musicbrainz;

#[cfg(test)]
pub mod test_server;
