use fatvol::types::ClusterID;
use fatvol::Cursor;
use pretty_hex::pretty_hex;

use crate::error::Result;
use crate::Volume;

pub fn info(volume: &mut Volume, cursor: &Cursor, path: &str) -> Result<()> {
    let entry = volume.stat(cursor, path)?;
    let chain = volume.cluster_chain(cursor, path)?;
    println!("name:      {}", entry.name());
    println!("type:      {}", if entry.is_directory { "directory" } else { "file" });
    println!("size:      {}", entry.size);
    let clusters: Vec<String> = chain.iter().map(|cluster_id| cluster_id.to_string()).collect();
    println!("clusters:  {}", clusters.join(" "));
    Ok(())
}

pub fn check(volume: &mut Volume) -> Result<()> {
    let report = volume.check()?;
    for cluster_id in report.bad.iter() {
        println!("bad cluster {}", cluster_id);
    }
    for cluster_id in report.mismatched.iter() {
        println!("table copies differ on cluster {}", cluster_id);
    }
    if report.is_clean() {
        println!("clean");
    }
    Ok(())
}

/// Both table copies, free entries skipped
pub fn fat(volume: &mut Volume) -> Result<()> {
    let layout = *volume.layout();
    println!("{:>8} {:>11} {:>11}", "cluster", "copy 1", "copy 2");
    for (index, (first, second)) in volume.table_entries()?.into_iter().enumerate() {
        if first == 0 && second == 0 {
            continue;
        }
        let marker = if index < layout.reserved_clusters() as usize { " reserved" } else { "" };
        println!("{:>8} {:>11} {:>11}{}", index, first, second, marker);
    }
    println!("free clusters: {}", volume.free_clusters()?);
    Ok(())
}

pub fn dump(volume: &mut Volume, cluster: u32) -> Result<()> {
    let bytes = volume.read_cluster(ClusterID::from(cluster))?;
    println!("{}", pretty_hex(&bytes));
    Ok(())
}

pub fn geometry(volume: &mut Volume) -> Result<()> {
    let layout = *volume.layout();
    println!("total size:          {}", layout.total_size);
    println!("cluster size:        {}", layout.cluster_size);
    println!("cluster count:       {}", layout.cluster_count);
    println!("table clusters:      {}", layout.table_cluster_count);
    println!("table offsets:       {} {}", layout.table1_offset, layout.table2_offset);
    println!("data offset:         {}", layout.data_offset);
    println!("root cluster:        {}", volume.root());
    println!("free clusters:       {}", volume.free_clusters()?);
    Ok(())
}
