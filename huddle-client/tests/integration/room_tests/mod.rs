mod test_peer_joined_offers;
mod test_peer_updated_merges;
mod test_remote_stream_surfaces;
