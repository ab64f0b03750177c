//! Run statistics. Workers aggregate locally and send their totals over
//! channels once they finish; the accumulator drains them after the join.
use crossbeam_channel::{unbounded, Receiver, Sender, Select};
use hashbrown::HashMap;
use std::io::{self, Write};
use super::mc::Float;

type Counters = HashMap<&'static str, i64>;
/// Value is (sum, count, min, max).
type IntDistributions = HashMap<&'static str, (i64, i64, i64, i64)>;
/// Value is (sum, count, min, max).
type FloatDistributions = HashMap<&'static str, (Float, i64, Float, Float)>;
/// Value is (numerator, denominator).
type Percentages = HashMap<&'static str, (i64, i64)>;

fn add_int(map: &mut IntDistributions, name: &'static str, sum: i64, count: i64, min: i64, max: i64) {
    let d = map.entry(name).or_insert((0, 0, std::i64::MAX, std::i64::MIN));
    d.0 += sum;
    d.1 += count;
    d.2 = d.2.min(min);
    d.3 = d.3.max(max);
}

fn add_float(map: &mut FloatDistributions, name: &'static str, sum: Float, count: i64, min: Float, max: Float) {
    let d = map.entry(name).or_insert((0.0, 0, Float::INFINITY, Float::NEG_INFINITY));
    d.0 += sum;
    d.1 += count;
    d.2 = d.2.min(min);
    d.3 = d.3.max(max);
}

pub struct StatsAccumulator {
    r_counter: Receiver<Counters>,
    s_counter: Sender<Counters>,
    r_int_distribution: Receiver<IntDistributions>,
    s_int_distribution: Sender<IntDistributions>,
    r_float_distribution: Receiver<FloatDistributions>,
    s_float_distribution: Sender<FloatDistributions>,
    r_percentage: Receiver<Percentages>,
    s_percentage: Sender<Percentages>
}

impl StatsAccumulator {
    pub fn new() -> StatsAccumulator {
        let (s_counter, r_counter) = unbounded();
        let (s_int_distribution, r_int_distribution) = unbounded();
        let (s_float_distribution, r_float_distribution) = unbounded();
        let (s_percentage, r_percentage) = unbounded();

        StatsAccumulator {
            r_counter,
            s_counter,
            r_int_distribution,
            s_int_distribution,
            r_float_distribution,
            s_float_distribution,
            r_percentage,
            s_percentage
        }
    }

    /// A reporter for one worker.
    pub fn reporter(&self) -> StatsReporter {
        StatsReporter {
            s_counter: self.s_counter.clone(),
            s_int_distribution: self.s_int_distribution.clone(),
            s_float_distribution: self.s_float_distribution.clone(),
            s_percentage: self.s_percentage.clone(),
            counters: HashMap::new(),
            int_distributions: HashMap::new(),
            float_distributions: HashMap::new(),
            percentages: HashMap::new()
        }
    }

    /// Loop over the receivers until every pending report is consumed.
    pub fn accumulate(&self) -> RunStatistics {
        let mut stats = RunStatistics::default();
        let mut select = Select::new();
        let counter = select.recv(&self.r_counter);
        let int_distribution = select.recv(&self.r_int_distribution);
        let float_distribution = select.recv(&self.r_float_distribution);
        let percentage = select.recv(&self.r_percentage);

        loop {
            let index = match select.try_ready() {
                Err(_) => break,
                Ok(i) => i
            };

            if index == counter {
                if let Ok(counters) = self.r_counter.try_recv() {
                    for (name, val) in counters {
                        *stats.counters.entry(name).or_default() += val;
                    }
                }
            } else if index == int_distribution {
                if let Ok(distributions) = self.r_int_distribution.try_recv() {
                    for (name, (sum, count, min, max)) in distributions {
                        add_int(&mut stats.int_distributions, name, sum, count, min, max);
                    }
                }
            } else if index == float_distribution {
                if let Ok(distributions) = self.r_float_distribution.try_recv() {
                    for (name, (sum, count, min, max)) in distributions {
                        add_float(&mut stats.float_distributions, name, sum, count, min, max);
                    }
                }
            } else if index == percentage {
                if let Ok(percentages) = self.r_percentage.try_recv() {
                    for (name, (num, denom)) in percentages {
                        let p = stats.percentages.entry(name).or_default();
                        p.0 += num;
                        p.1 += denom;
                    }
                }
            }
        }
        stats
    }
}

impl Default for StatsAccumulator {
    fn default() -> StatsAccumulator {
        StatsAccumulator::new()
    }
}

/// Per worker statistics, sent to the accumulator by `finish` or on drop.
pub struct StatsReporter {
    s_counter: Sender<Counters>,
    s_int_distribution: Sender<IntDistributions>,
    s_float_distribution: Sender<FloatDistributions>,
    s_percentage: Sender<Percentages>,
    counters: Counters,
    int_distributions: IntDistributions,
    float_distributions: FloatDistributions,
    percentages: Percentages
}

impl StatsReporter {
    pub fn report_counter(&mut self, name: &'static str, val: i64) {
        *self.counters.entry(name).or_default() += val;
    }

    pub fn report_int_distribution(&mut self, name: &'static str, val: i64) {
        add_int(&mut self.int_distributions, name, val, 1, val, val);
    }

    pub fn report_float_distribution(&mut self, name: &'static str, val: Float) {
        add_float(&mut self.float_distributions, name, val, 1, val, val);
    }

    pub fn report_percentage(&mut self, name: &'static str, num: i64, denom: i64) {
        let p = self.percentages.entry(name).or_default();
        p.0 += num;
        p.1 += denom;
    }

    /// Send the worker totals. A closed accumulator drops them.
    pub fn finish(&mut self) {
        if !self.counters.is_empty() {
            let _ = self.s_counter.send(std::mem::replace(&mut self.counters, HashMap::new()));
        }
        if !self.int_distributions.is_empty() {
            let _ = self.s_int_distribution.send(std::mem::replace(&mut self.int_distributions, HashMap::new()));
        }
        if !self.float_distributions.is_empty() {
            let _ = self.s_float_distribution.send(std::mem::replace(&mut self.float_distributions, HashMap::new()));
        }
        if !self.percentages.is_empty() {
            let _ = self.s_percentage.send(std::mem::replace(&mut self.percentages, HashMap::new()));
        }
    }
}

impl Drop for StatsReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Aggregated statistics of a run. Names are `category/title`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    pub counters: Counters,
    pub int_distributions: IntDistributions,
    pub float_distributions: FloatDistributions,
    pub percentages: Percentages
}

impl RunStatistics {
    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).cloned().unwrap_or(0)
    }

    /// Mean of a distribution, if anything was reported to it.
    pub fn mean(&self, name: &str) -> Option<Float> {
        if let Some(&(sum, count, _, _)) = self.int_distributions.get(name) {
            if count > 0 {
                return Some(sum as Float / count as Float);
            }
        }
        match self.float_distributions.get(name) {
            Some(&(sum, count, _, _)) if count > 0 => Some(sum / count as Float),
            _ => None
        }
    }

    pub fn print<T: Write>(&self, dest: &mut T) -> io::Result<()> {
        let mut to_print: HashMap<&str, Vec<String>> = HashMap::default();

        for (counter, value) in &self.counters {
            let (category, title) = get_category_and_title(counter);
            to_print.entry(category).or_default().push(format!("{:<42}               {:12}", title, value));
        }

        for (counter, value) in &self.int_distributions {
            if value.1 == 0 {
                continue;
            }
            let (category, title) = get_category_and_title(counter);
            let avg = value.0 as Float / value.1 as Float;
            to_print.entry(category).or_default()
                .push(format!("{:<42}                      {:.3} avg [range {} - {}]", title, avg, value.2, value.3));
        }

        for (counter, value) in &self.float_distributions {
            if value.1 == 0 {
                continue;
            }
            let (category, title) = get_category_and_title(counter);
            let avg = value.0 / value.1 as Float;
            to_print.entry(category).or_default()
                .push(format!("{:<42}                      {:.3} avg [range {:.3} - {:.3}]", title, avg, value.2, value.3));
        }

        for (counter, value) in &self.percentages {
            if value.1 == 0 {
                continue;
            }
            let (category, title) = get_category_and_title(counter);
            let percent = value.0 as Float * 100.0 / value.1 as Float;
            to_print.entry(category).or_default()
                .push(format!("{:<42}{:12} {:12} ({:.2}%)", title, value.0, value.1, percent));
        }

        let mut categories: Vec<_> = to_print.into_iter().collect();
        categories.sort_by(|a, b| a.0.cmp(&b.0));
        for (category, mut items) in categories {
            items.sort();
            writeln!(dest, "  {}", category)?;
            for item in items {
                writeln!(dest, "    {}", item)?;
            }
        }
        Ok(())
    }
}

#[inline]
pub fn get_category_and_title(s: &str) -> (&str, &str) {
    let split: Vec<&str> = s.splitn(2, '/').collect();
    if split.len() == 1 {
        ("", split[0])
    } else {
        (split[0], split[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workers_are_summed() {
        let accumulator = StatsAccumulator::new();
        {
            let mut a = accumulator.reporter();
            a.report_counter("Photons/Exited top", 2);
            a.report_int_distribution("Photons/Collisions", 4);
            let mut b = accumulator.reporter();
            b.report_counter("Photons/Exited top", 3);
            b.report_int_distribution("Photons/Collisions", 10);
            b.report_percentage("Photons/Absorbed", 1, 4);
        }
        let stats = accumulator.accumulate();
        assert_eq!(stats.counter("Photons/Exited top"), 5);
        assert_eq!(stats.counter("Photons/Missing"), 0);
        assert_eq!(stats.mean("Photons/Collisions"), Some(7.0));
        assert_eq!(stats.int_distributions["Photons/Collisions"], (14, 2, 4, 10));
        assert_eq!(stats.percentages["Photons/Absorbed"], (1, 4));

        let mut out = Vec::new();
        stats.print(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Exited top"));
    }

    #[test]
    fn test_category_and_title() {
        assert_eq!(get_category_and_title("Photons/Absorbed"), ("Photons", "Absorbed"));
        assert_eq!(get_category_and_title("Total"), ("", "Total"));
    }
}
